//! Named uniform interface
//!
//! Scene code addresses shader inputs by name (`model`, `dirLight.color`,
//! `pointLights[3].position`, ...). [`UniformState`] resolves those names onto
//! the single [`ShaderUniforms`] block bound at group 0 of every pipeline.
//! The render engine snapshots it once per draw call.
//!
//! The WGSL side declares the same layout in `shaders/default.wgsl`.

use cgmath::{Matrix4, SquareMatrix};

use crate::{error::UniformError, gfx::commands::UniformValue};

/// Point lights the shader interface can hold
pub const MAX_LIGHTS: usize = 16;

/// Dynamic-offset stride between per-draw uniform snapshots
pub const UNIFORM_STRIDE: u64 = 1024;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub linear_attenuation: f32,
    pub color: [f32; 3],
    pub quad_attenuation: f32,
}

/// Uniform block at group 0, binding 0
///
/// # Memory Layout
///
/// Every `vec3` is packed with a trailing scalar so the struct matches WGSL
/// uniform alignment without explicit padding arrays. `normal_mat` is a 3x3
/// matrix stored in the upper-left of a 4x4.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_mat: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_space_mat: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub shininess: f32,
    pub diffuse_color: [f32; 3],
    pub ambient_intensity: f32,
    pub specular_color: [f32; 3],
    pub has_dir_light: u32,
    pub ambient_color: [f32; 3],
    pub num_point_lights: u32,
    pub dir_light_direction: [f32; 3],
    pub _pad0: f32,
    pub dir_light_color: [f32; 3],
    pub _pad1: f32,
    pub point_lights: [PointLightUniform; MAX_LIGHTS],
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        Self {
            model: identity,
            normal_mat: identity,
            view: identity,
            projection: identity,
            light_space_mat: identity,
            ..bytemuck::Zeroable::zeroed()
        }
    }
}

/// Current value of every named uniform, updated command by command
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformState {
    block: ShaderUniforms,
}

impl UniformState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self) -> &ShaderUniforms {
        &self.block
    }

    /// Writes one named uniform
    ///
    /// # Arguments
    /// * `name` - Uniform name as used by the scene
    /// * `value` - Value; its variant must match the uniform's type
    ///
    /// # Returns
    /// An error for unknown names, wrong value types or light indices at or
    /// past [`MAX_LIGHTS`]. The state is unchanged in that case.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        if let Some(rest) = name.strip_prefix("pointLights[") {
            return self.set_point_light(name, rest, value);
        }

        let b = &mut self.block;
        match name {
            "model" => b.model = mat4(name, value)?,
            "normalMat" => b.normal_mat = mat3(name, value)?,
            "view" => b.view = mat4(name, value)?,
            "projection" => b.projection = mat4(name, value)?,
            "lightSpaceMat" => b.light_space_mat = mat4(name, value)?,
            "viewPos" => b.view_pos = vec3(name, value)?,
            "diffuseColor" => b.diffuse_color = vec3(name, value)?,
            "specularColor" => b.specular_color = vec3(name, value)?,
            "ambientColor" => b.ambient_color = vec3(name, value)?,
            "shininess" => b.shininess = float(name, value)?,
            "ambientIntensity" => b.ambient_intensity = float(name, value)?,
            "hasDirLight" => b.has_dir_light = boolean(name, value)? as u32,
            "dirLight.direction" => b.dir_light_direction = vec3(name, value)?,
            "dirLight.color" => b.dir_light_color = vec3(name, value)?,
            "numPointLights" => {
                let count = int(name, value)?;
                if count < 0 || count as usize > MAX_LIGHTS {
                    return Err(UniformError::LightIndex(count.max(0) as usize));
                }
                b.num_point_lights = count as u32;
            }
            // Sampler slots are fixed by the bind group layouts
            "diffuseTex" | "specularTex" | "shadowMap" => {
                int(name, value)?;
            }
            _ => return Err(UniformError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn set_point_light(
        &mut self,
        name: &str,
        rest: &str,
        value: UniformValue,
    ) -> Result<(), UniformError> {
        let (index, field) = rest
            .split_once("].")
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        let index: usize = index
            .parse()
            .map_err(|_| UniformError::Unknown(name.to_string()))?;
        if index >= MAX_LIGHTS {
            return Err(UniformError::LightIndex(index));
        }

        let light = &mut self.block.point_lights[index];
        match field {
            "position" => light.position = vec3(name, value)?,
            "color" => light.color = vec3(name, value)?,
            "linearAttenuation" => light.linear_attenuation = float(name, value)?,
            "quadAttenuation" => light.quad_attenuation = float(name, value)?,
            _ => return Err(UniformError::Unknown(name.to_string())),
        }
        Ok(())
    }
}

fn mismatch(name: &str, expected: &'static str) -> UniformError {
    UniformError::TypeMismatch {
        name: name.to_string(),
        expected,
    }
}

fn mat4(name: &str, value: UniformValue) -> Result<[[f32; 4]; 4], UniformError> {
    match value {
        UniformValue::Mat4(m) => Ok(m.into()),
        _ => Err(mismatch(name, "mat4")),
    }
}

fn mat3(name: &str, value: UniformValue) -> Result<[[f32; 4]; 4], UniformError> {
    match value {
        UniformValue::Mat3(m) => Ok(Matrix4::from(m).into()),
        _ => Err(mismatch(name, "mat3")),
    }
}

fn vec3(name: &str, value: UniformValue) -> Result<[f32; 3], UniformError> {
    match value {
        UniformValue::Vec3(v) => Ok(v.into()),
        _ => Err(mismatch(name, "vec3")),
    }
}

fn float(name: &str, value: UniformValue) -> Result<f32, UniformError> {
    match value {
        UniformValue::Float(f) => Ok(f),
        _ => Err(mismatch(name, "float")),
    }
}

fn int(name: &str, value: UniformValue) -> Result<i32, UniformError> {
    match value {
        UniformValue::Int(i) => Ok(i),
        _ => Err(mismatch(name, "int")),
    }
}

fn boolean(name: &str, value: UniformValue) -> Result<bool, UniformError> {
    match value {
        UniformValue::Bool(b) => Ok(b),
        _ => Err(mismatch(name, "bool")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Matrix3, Vector3};

    #[test]
    fn test_block_fits_stride() {
        let size = std::mem::size_of::<ShaderUniforms>() as u64;
        assert_eq!(size % 16, 0);
        assert!(size <= UNIFORM_STRIDE);
        assert_eq!(UNIFORM_STRIDE % 256, 0);
    }

    #[test]
    fn test_sets_named_fields() {
        let mut state = UniformState::new();
        state
            .set("diffuseColor", UniformValue::Vec3(Vector3::new(1.0, 0.5, 0.0)))
            .unwrap();
        state
            .set("pointLights[15].quadAttenuation", UniformValue::Float(0.2))
            .unwrap();
        state.set("hasDirLight", UniformValue::Bool(true)).unwrap();
        state
            .set("normalMat", UniformValue::Mat3(Matrix3::from_value(2.0)))
            .unwrap();

        let block = state.block();
        assert_eq!(block.diffuse_color, [1.0, 0.5, 0.0]);
        assert_eq!(block.point_lights[15].quad_attenuation, 0.2);
        assert_eq!(block.has_dir_light, 1);
        assert_eq!(block.normal_mat[0], [2.0, 0.0, 0.0, 0.0]);
        assert_eq!(block.normal_mat[2], [0.0, 0.0, 2.0, 0.0]);
        assert_eq!(block.normal_mat[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_rejects_unknown_names_and_indices() {
        let mut state = UniformState::new();
        let before = state.clone();

        assert_eq!(
            state.set("pointLights[16].color", UniformValue::Vec3(Vector3::new(1.0, 1.0, 1.0))),
            Err(UniformError::LightIndex(16))
        );
        assert_eq!(
            state.set("numPointLights", UniformValue::Int(17)),
            Err(UniformError::LightIndex(17))
        );
        assert!(matches!(
            state.set("roughness", UniformValue::Float(1.0)),
            Err(UniformError::Unknown(_))
        ));
        assert!(matches!(
            state.set("pointLights[2].radius", UniformValue::Float(1.0)),
            Err(UniformError::Unknown(_))
        ));
        assert!(matches!(
            state.set("model", UniformValue::Float(1.0)),
            Err(UniformError::TypeMismatch { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_sampler_names_take_units_without_touching_the_block() {
        let mut state = UniformState::new();
        let before = state.clone();

        state.set("diffuseTex", UniformValue::Int(0)).unwrap();
        state.set("specularTex", UniformValue::Int(1)).unwrap();
        state.set("shadowMap", UniformValue::Int(2)).unwrap();
        assert_eq!(state, before);

        assert!(matches!(
            state.set("shadowMap", UniformValue::Float(2.0)),
            Err(UniformError::TypeMismatch { .. })
        ));
    }
}
