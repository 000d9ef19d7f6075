//! # Headless Rasterizer
//!
//! [`HeadlessSurface`] draws every geom and visible site as a lit, textured
//! disc seen through a perspective camera, painter's-algorithm style, with
//! optional ground shadows from each light that casts them. It trades
//! fidelity for having no GPU or window dependency, which is all the
//! observation pipeline and frame capture need.

use crate::camera::{Camera, CameraMode};
use crate::error::RenderError;
use crate::frame::Frame;
use crate::surface::RenderSurface;
use crate::texture::Texture;
use glam::{Mat4, Vec3, Vec4Swizzles};
use sim::Simulator;

const BACKGROUND: [u8; 3] = [40, 44, 52];
const AMBIENT: f32 = 0.4;
const SHADOW_FACTOR: f32 = 0.55;
/// Largest frame a surface accepts, in pixels.
pub const MAX_PIXELS: u64 = 1 << 26;

fn to_glam(v: sim::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Point light declared by the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub name: String,
    pub pos: Vec3,
    pub castshadow: bool,
}

/// A sphere projected to screen space.
struct Disc {
    /// Geoms first, then visible sites, in simulator order.
    source: usize,
    center: (f32, f32),
    radius: f32,
    depth: f32,
    world_radius: f32,
    texture: Texture,
    light_dir: Option<Vec3>,
}

/// A ground shadow cast by the geom with source index `caster`.
struct Shadow {
    caster: usize,
    center: (f32, f32),
    radius: f32,
    depth: f32,
}

pub struct HeadlessSurface {
    width: u32,
    height: u32,
    materials: Vec<(String, Texture)>,
    cameras: Vec<(String, Vec3)>,
    lights: Vec<Light>,
    /// Point every scene camera is aimed at.
    fixed_target: Vec3,
    ground_height: f32,
    viewer: Camera,
    mode: CameraMode,
}

impl HeadlessSurface {
    /// Build a surface for the geoms, cameras and lights `sim` declares.
    ///
    /// Scene cameras aim at the centroid of the geoms at construction time.
    ///
    /// # Errors
    /// Returns [`RenderError::EmptyFrame`] if either dimension is zero and
    /// [`RenderError::FrameTooLarge`] above [`MAX_PIXELS`].
    #[allow(clippy::cast_precision_loss)]
    pub fn new(sim: &dyn Simulator, width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyFrame { width, height });
        }
        if u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(RenderError::FrameTooLarge {
                width,
                height,
                max: MAX_PIXELS,
            });
        }
        let geoms = sim.geoms();
        let fixed_target = if geoms.is_empty() {
            Vec3::ZERO
        } else {
            geoms.iter().map(|g| to_glam(g.pos)).sum::<Vec3>() / geoms.len() as f32
        };
        let materials = geoms
            .iter()
            .map(|g| (g.name.clone(), Texture::from_rgba(g.rgba)))
            .collect();
        let cameras = sim
            .cameras()
            .into_iter()
            .map(|c| (c.name, to_glam(c.pos)))
            .collect();
        let lights = sim
            .lights()
            .into_iter()
            .map(|l| Light {
                name: l.name,
                pos: to_glam(l.pos),
                castshadow: false,
            })
            .collect();

        let mut viewer = Camera::looking_at(Vec3::ZERO, fixed_target, width, height);
        viewer.orbit(fixed_target, 2.0, 90.0, -30.0);
        tracing::debug!(width, height, "headless surface created");

        Ok(Self {
            width,
            height,
            materials,
            cameras,
            lights,
            fixed_target,
            ground_height: 0.0,
            viewer,
            mode: CameraMode::Fixed(0),
        })
    }

    /// Height of the plane shadows fall on.
    #[must_use]
    pub fn with_ground_height(mut self, height: f32) -> Self {
        self.ground_height = height;
        self
    }

    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    #[must_use]
    pub fn viewer(&self) -> &Camera {
        &self.viewer
    }

    #[must_use]
    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.materials.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    #[must_use]
    pub fn camera_pos(&self, name: &str) -> Option<Vec3> {
        self.cameras.iter().find(|(n, _)| n == name).map(|(_, p)| *p)
    }

    #[must_use]
    pub fn light(&self, name: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.name == name)
    }

    fn light_mut(&mut self, name: &str) -> Result<&mut Light, RenderError> {
        self.lights
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| RenderError::UnknownLight(name.to_owned()))
    }

    fn active_camera(&self) -> Result<Camera, RenderError> {
        match self.mode {
            CameraMode::Free => Ok(self.viewer.clone()),
            CameraMode::Fixed(index) => self
                .cameras
                .get(index)
                .map(|(_, pos)| Camera::looking_at(*pos, self.fixed_target, self.width, self.height))
                .ok_or(RenderError::NoSuchFixedCamera {
                    index,
                    count: self.cameras.len(),
                }),
        }
    }

    /// Screen position, pixel radius and view depth of a world sphere.
    #[allow(clippy::cast_precision_loss)]
    fn project(
        &self,
        view_proj: &Mat4,
        camera: &Camera,
        center: Vec3,
        radius: f32,
    ) -> Option<((f32, f32), f32, f32)> {
        let clip = *view_proj * center.extend(1.0);
        if clip.w <= camera.znear {
            return None;
        }
        let to_screen = |ndc: Vec3| {
            (
                (ndc.x + 1.0) * 0.5 * self.width as f32,
                (1.0 - ndc.y) * 0.5 * self.height as f32,
            )
        };
        let c = to_screen(clip.xyz() / clip.w);
        let edge = *view_proj * (center + camera.right() * radius).extend(1.0);
        let e = to_screen(edge.xyz() / edge.w);
        let r = ((e.0 - c.0).powi(2) + (e.1 - c.1).powi(2)).sqrt();
        Some((c, r, clip.w))
    }

    /// Pixel bounds of a disc clipped to the frame.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn bounds(&self, center: (f32, f32), radius: f32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (center.0 - radius).floor().max(0.0);
        let y0 = (center.1 - radius).floor().max(0.0);
        let x1 = (center.0 + radius).ceil().min(self.width as f32 - 1.0);
        let y1 = (center.1 + radius).ceil().min(self.height as f32 - 1.0);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn shade(rgb: [u8; 3], brightness: f32) -> [u8; 3] {
    rgb.map(|c| (f32::from(c) * brightness).round().clamp(0.0, 255.0) as u8)
}

impl RenderSurface for HeadlessSurface {
    fn surface_names(&self) -> Vec<String> {
        self.materials.iter().map(|(n, _)| n.clone()).collect()
    }

    fn randomize_surface(&mut self, name: &str, rng: &mut fastrand::Rng) -> Result<(), RenderError> {
        let (_, texture) = self
            .materials
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| RenderError::UnknownSurface(name.to_owned()))?;
        *texture = Texture::random(rng);
        Ok(())
    }

    fn set_camera_pos(&mut self, name: &str, pos: sim::Vec3) -> Result<(), RenderError> {
        let (_, slot) = self
            .cameras
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| RenderError::UnknownCamera(name.to_owned()))?;
        *slot = to_glam(pos);
        Ok(())
    }

    fn set_light_castshadow(&mut self, name: &str, castshadow: bool) -> Result<(), RenderError> {
        self.light_mut(name)?.castshadow = castshadow;
        Ok(())
    }

    fn set_light_pos(&mut self, name: &str, pos: sim::Vec3) -> Result<(), RenderError> {
        self.light_mut(name)?.pos = to_glam(pos);
        Ok(())
    }

    fn use_fixed_camera(&mut self, index: usize) -> Result<(), RenderError> {
        if index >= self.cameras.len() {
            return Err(RenderError::NoSuchFixedCamera {
                index,
                count: self.cameras.len(),
            });
        }
        self.mode = CameraMode::Fixed(index);
        Ok(())
    }

    fn use_free_camera(&mut self) {
        self.mode = CameraMode::Free;
    }

    fn setup_view(&mut self, lookat: sim::Vec3, distance: f32, azimuth: f32, elevation: f32) {
        self.viewer.orbit(to_glam(lookat), distance, azimuth, elevation);
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn read_pixels(&self, sim: &dyn Simulator) -> Result<Frame, RenderError> {
        let camera = self.active_camera()?;
        let view = camera.view_matrix();
        let view_proj = camera.build_view_projection_matrix();
        let key_light = self.lights.first().map(|l| l.pos);

        let mut discs = Vec::new();
        let mut casters = Vec::new();
        for (source, geom) in sim.geoms().into_iter().enumerate() {
            let texture = self
                .texture(&geom.name)
                .cloned()
                .unwrap_or_else(|| Texture::from_rgba(geom.rgba));
            casters.push((source, to_glam(geom.pos), geom.radius));
            discs.push((to_glam(geom.pos), geom.radius, texture));
        }
        for site in sim.visible_sites() {
            discs.push((to_glam(site.pos), site.radius, Texture::from_rgba(site.rgba)));
        }

        let mut projected: Vec<Disc> = discs
            .into_iter()
            .enumerate()
            .filter_map(|(source, (center, radius, texture))| {
                let (c, r, depth) = self.project(&view_proj, &camera, center, radius)?;
                let light_dir = key_light
                    .map(|l| view.transform_vector3(l - center).normalize_or_zero());
                Some(Disc {
                    source,
                    center: c,
                    radius: r,
                    depth,
                    world_radius: radius,
                    texture,
                    light_dir,
                })
            })
            .collect();
        projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        let mut frame = Frame::new(self.width, self.height, BACKGROUND);
        let mut owner: Vec<Option<usize>> = vec![None; self.width as usize * self.height as usize];
        for (index, disc) in projected.iter().enumerate() {
            let Some((x0, y0, x1, y1)) = self.bounds(disc.center, disc.radius) else {
                continue;
            };
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let u = (x as f32 + 0.5 - disc.center.0) / disc.radius.max(1e-3);
                    let v = (y as f32 + 0.5 - disc.center.1) / disc.radius.max(1e-3);
                    let d2 = u * u + v * v;
                    if d2 > 1.0 {
                        continue;
                    }
                    let brightness = disc.light_dir.map_or(1.0, |l| {
                        let normal = Vec3::new(u, -v, (1.0 - d2).sqrt());
                        AMBIENT + (1.0 - AMBIENT) * normal.dot(l).max(0.0)
                    });
                    frame.put(x, y, shade(disc.texture.sample(u, v), brightness));
                    owner[self.pixel_index(x, y)] = Some(index);
                }
            }
        }

        let shadows: Vec<Shadow> = self
            .lights
            .iter()
            .filter(|l| l.castshadow)
            .flat_map(|light| {
                casters.iter().filter_map(move |&(caster, center, radius)| {
                    let height = center.z - self.ground_height;
                    if light.pos.z <= center.z || height <= radius {
                        return None;
                    }
                    let t = (light.pos.z - self.ground_height) / (light.pos.z - center.z);
                    Some((caster, light.pos + (center - light.pos) * t, radius))
                })
            })
            .filter_map(|(caster, ground, radius)| {
                let (c, r, depth) = self.project(&view_proj, &camera, ground, radius)?;
                Some(Shadow {
                    caster,
                    center: c,
                    radius: r,
                    depth,
                })
            })
            .collect();

        for shadow in &shadows {
            let Some((x0, y0, x1, y1)) = self.bounds(shadow.center, shadow.radius) else {
                continue;
            };
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let dx = x as f32 + 0.5 - shadow.center.0;
                    let dy = y as f32 + 0.5 - shadow.center.1;
                    if dx * dx + dy * dy > shadow.radius * shadow.radius {
                        continue;
                    }
                    // Only receivers at or behind the shadow's depth darken.
                    let Some(index) = owner[self.pixel_index(x, y)] else {
                        continue;
                    };
                    let receiver = &projected[index];
                    if receiver.source == shadow.caster
                        || receiver.depth + receiver.world_radius < shadow.depth
                    {
                        continue;
                    }
                    frame.put(x, y, shade(frame.pixel(x, y), SHADOW_FACTOR));
                }
            }
        }

        tracing::trace!(discs = projected.len(), shadows = shadows.len(), "frame rasterized");
        Ok(frame)
    }
}
