use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    color::Color,
    math::{degrees_to_radians, perspective},
    pipeline::{CullingMode, RenderMode},
    sampler::{TextureEdge, TextureFilter},
    shaders::{DirectionalLight, PointLight, RenderContext},
    vec::{Mat4x4, Vec3},
};

/// Everything needed to render one frame, usually read from a TOML file. Every table and every
/// field is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub rendering: RenderingConfig,
    pub camera: Camera,
    pub lights: Lights,
    pub texture: Option<TextureConfig>,
    pub model: Option<Model>,
}

impl Scene {
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file {path:?}"))?;
        let scene = Self::from_toml_str(&contents)
            .with_context(|| format!("failed to parse scene {path:?}"))?;
        log::debug!("loaded scene {path:?}");
        Ok(scene)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let scene: Scene = toml::from_str(contents)?;
        scene.check();
        Ok(scene)
    }

    /// Warns about settings that are accepted but probably not what was meant.
    fn check(&self) {
        let rendering = &self.rendering;
        if rendering.far <= rendering.near {
            log::warn!(
                "far plane ({}) is not beyond the near plane ({})",
                rendering.far,
                rendering.near
            );
        }
        if self.lights.point.radius <= 0. {
            log::warn!("point light radius is not positive, the point light is disabled");
        }
        if self.texture.is_none() && rendering.filter != TextureFilter::Nearest {
            log::warn!("texture filter {:?} has no effect without a texture", rendering.filter);
        }
    }

    /// Local to world transform of the camera: rotation first, then translation.
    pub fn camera_transform(&self) -> Mat4x4 {
        self.camera.rotation_radians().to_rotation() * self.camera.position.to_translation()
    }

    pub fn view(&self) -> Mat4x4 {
        self.camera_transform().orthogonal_inverse()
    }

    /// World space direction the camera looks at.
    pub fn camera_forward_world(&self) -> Vec3 {
        (Vec3::from([0., 0., 1.]).to_dir() * self.camera_transform()).xyz()
    }

    pub fn projection(&self) -> Mat4x4 {
        let r = &self.rendering;
        perspective(r.width as f32, r.height as f32, r.fovy, r.near, r.far)
    }

    pub fn model_transform(&self) -> Mat4x4 {
        self.model.as_ref().map_or_else(Mat4x4::identity, Model::transform)
    }

    /// Builds the context a frame of this scene is drawn with. Face culling runs after the
    /// perspective divide, so the forward vector is the NDC depth axis.
    pub fn render_context(&self, max_mip_level: usize) -> RenderContext {
        let lights = &self.lights;
        RenderContext {
            world: self.model_transform(),
            view: self.view(),
            projection: self.projection(),
            directional_light: DirectionalLight {
                direction: lights.directional.direction,
                color: lights.directional.color,
            },
            point_light: PointLight {
                position: lights.point.position,
                color: lights.point.color,
                radius: lights.point.radius,
            },
            ambient: lights.ambient,
            texture_filter: self.rendering.filter,
            texture_edge: self.rendering.edge,
            max_mip_level,
            near: self.rendering.near,
            far: self.rendering.far,
            camera_forward: Vec3::from([0., 0., 1.]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderingConfig {
    pub width: usize,
    pub height: usize,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
    #[serde(deserialize_with = "detail::deser_color")]
    pub clear_color: Color,
    pub mode: RenderMode,
    pub cull_mode: CullingMode,
    pub filter: TextureFilter,
    pub edge: TextureEdge,
    pub show_normals: bool,
    #[serde(deserialize_with = "detail::deser_opt_color")]
    pub outline_color: Option<Color>,
    /// Draw a ground grid under the model.
    pub grid: bool,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        RenderingConfig {
            width: 720,
            height: 500,
            fovy: 90.,
            near: 0.1,
            far: 100.,
            clear_color: 0xff16_3d49,
            mode: RenderMode::default(),
            cull_mode: CullingMode::default(),
            filter: TextureFilter::default(),
            edge: TextureEdge::default(),
            show_normals: false,
            outline_color: None,
            grid: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Camera {
    #[serde(deserialize_with = "detail::deser_vec3")]
    pub position: Vec3,
    /// Euler angles measured in degrees
    #[serde(deserialize_with = "detail::deser_vec3")]
    pub rotation: Vec3,
}

impl Camera {
    pub fn rotation_radians(&self) -> Vec3 {
        self.rotation.map(degrees_to_radians)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Vec3::from([0., 1., -3.]),
            rotation: Vec3::from([-15., 0., 0.]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lights {
    pub directional: DirectionalLightConfig,
    pub point: PointLightConfig,
    pub ambient: f32,
}

impl Default for Lights {
    fn default() -> Self {
        Lights {
            directional: DirectionalLightConfig::default(),
            point: PointLightConfig::default(),
            ambient: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    #[serde(deserialize_with = "detail::deser_vec3")]
    pub direction: Vec3,
    #[serde(deserialize_with = "detail::deser_color")]
    pub color: Color,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        DirectionalLightConfig {
            direction: Vec3::from([-0.577, -0.577, 0.577]),
            color: 0xffc0_c0f0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointLightConfig {
    #[serde(deserialize_with = "detail::deser_vec3")]
    pub position: Vec3,
    #[serde(deserialize_with = "detail::deser_color")]
    pub color: Color,
    pub radius: f32,
}

impl Default for PointLightConfig {
    fn default() -> Self {
        PointLightConfig {
            position: Vec3::from([-1., 0.5, 1.]),
            color: 0xffff_ff00,
            radius: 10.,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TextureConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Model {
    /// OBJ file to load. A unit cube is drawn when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "Vec3::zero", deserialize_with = "detail::deser_vec3")]
    pub position: Vec3,
    /// Euler angles measured in degrees
    #[serde(default = "Vec3::zero", deserialize_with = "detail::deser_vec3")]
    pub rotation: Vec3,
    #[serde(default = "Vec3::one", deserialize_with = "detail::deser_vec3")]
    pub scale: Vec3,
}

impl Model {
    pub fn transform(&self) -> Mat4x4 {
        self.scale.to_scale()
            * self.rotation.map(degrees_to_radians).to_rotation()
            * self.position.to_translation()
    }
}

mod detail {
    use serde::de::{Deserialize, Deserializer, Error};

    use crate::{color::Color, vec::Vec3};

    pub fn deser_vec3<'de, D>(deserializer: D) -> Result<Vec3, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Vec3::from(<[f32; 3] as Deserialize>::deserialize(deserializer)?))
    }

    /// `"#rrggbb"` is opaque, `"#aarrggbb"` carries its own alpha. A `0x` prefix works too.
    pub fn parse_color(hex: &str) -> Result<Color, String> {
        let digits = hex
            .strip_prefix('#')
            .or_else(|| hex.strip_prefix("0x"))
            .ok_or_else(|| format!("color {hex:?} must start with '#' or '0x'"))?;
        let value = u32::from_str_radix(digits, 16).map_err(|e| format!("color {hex:?}: {e}"))?;
        match digits.len() {
            6 => Ok(0xff00_0000 | value),
            8 => Ok(value),
            _ => Err(format!("color {hex:?} must have 6 or 8 hex digits")),
        }
    }

    pub fn deser_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        parse_color(&hex).map_err(Error::custom)
    }

    pub fn deser_opt_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deser_color(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_uses_defaults() {
        let scene = Scene::from_toml_str("").unwrap();
        assert_eq!(scene.rendering, RenderingConfig::default());
        assert_eq!(scene.rendering.clear_color, 0xff16_3d49);
        assert_eq!(scene.lights.point.radius, 10.);
        assert!(scene.model.is_none());

        let ctx = scene.render_context(0);
        assert_eq!(ctx.ambient, 0.3);
        assert_eq!(ctx.directional_light.color, 0xffc0_c0f0);
        assert_eq!(ctx.camera_forward.to_array(), [0., 0., 1.]);
    }

    #[test]
    fn parses_every_table() {
        let scene = Scene::from_toml_str(
            r##"
            [rendering]
            width = 64
            height = 32
            mode = "shaded"
            cull-mode = "disabled"
            filter = "trilinear"
            edge = "clamp"
            clear-color = "#102030"
            outline-color = "0x80ffffff"
            show-normals = true

            [camera]
            position = [0.0, 2.0, -4.0]

            [lights]
            ambient = 0.5
            point = { position = [1.0, 1.0, 1.0], color = "#ff0000", radius = 3.0 }

            [texture]
            path = "stone.png"

            [model]
            rotation = [0.0, 90.0, 0.0]
            "##,
        )
        .unwrap();

        let r = &scene.rendering;
        assert_eq!((r.width, r.height), (64, 32));
        assert_eq!(r.mode, RenderMode::Shaded);
        assert_eq!(r.cull_mode, CullingMode::Disabled);
        assert_eq!(r.filter, TextureFilter::Trilinear);
        assert_eq!(r.edge, TextureEdge::Clamp);
        assert_eq!(r.clear_color, 0xff10_2030);
        assert_eq!(r.outline_color, Some(0x80ff_ffff));
        assert!(r.show_normals);
        assert_eq!(r.near, 0.1);

        assert_eq!(scene.lights.ambient, 0.5);
        assert_eq!(scene.lights.point.color, 0xffff_0000);
        assert_eq!(scene.lights.directional, DirectionalLightConfig::default());
        assert_eq!(scene.texture.unwrap().path, PathBuf::from("stone.png"));
        let model = scene.model.unwrap();
        assert_eq!(model.path, None);
        assert_eq!(model.scale.to_array(), [1., 1., 1.]);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(detail::parse_color("102030").is_err());
        assert!(detail::parse_color("#12345").is_err());
        assert!(detail::parse_color("#zzzzzz").is_err());
        assert!(Scene::from_toml_str("[rendering]\nclear-color = \"blue\"").is_err());
    }

    #[test]
    fn view_undoes_the_camera() {
        let scene = Scene::from_toml_str("[camera]\nposition = [1.0, 2.0, 3.0]\nrotation = [0.0, 0.0, 0.0]")
            .unwrap();
        let eye = Vec3::from([1., 2., 3.]).to_hom() * scene.view();
        assert!(eye.xyz().mag() < 1e-5);
        assert_eq!(scene.camera_forward_world().to_array(), [0., 0., 1.]);
    }
}
