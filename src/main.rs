use neeps::{config::EditorConfig, NeepsApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("neeps=info"))
        .init();

    let config = EditorConfig::from_env();
    log::info!(
        "starting neeps: assets {}, scene {}",
        config.assets.display(),
        config.scene.display()
    );

    NeepsApp::new(config)?.run()
}
