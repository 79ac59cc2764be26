//! Deferred renderer with a directional shadow map
//!
//! Each frame runs two viewports: the light viewport renders the shadow
//! map, the fullscreen viewport renders the G-buffer, the lighting quad,
//! the skybox and the transparent objects. A frame is built into the
//! `RenderCommandList`, sorted, replayed on the graphics device and
//! cleared.
//!
//! The renderer holds its collaborators explicitly: the graphics device
//! and the resource manager are shared handles given at construction.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::camera::{calculate_depth, Camera, Frustum, ProjectionParameters, ViewportTransform};
use crate::culling::intersect;
use crate::error::{Error, Result};
use crate::graphics_device::{
    ClearMask, DepthFunction, Filter, FramebufferDesc, FramebufferTarget, GraphicsDevice, Rect,
    TextureDesc, TextureFormat, TextureTarget,
};
use crate::resource::{
    MaterialData, MaterialId, MeshId, ResourceManager, ShaderData, ShaderId, TextureManager,
    UniformValue,
};
use crate::scene::{Entity, Scene, TransformUpdateReceiver};
use crate::utils::BitPackSet;
use crate::{engine_debug, engine_err, engine_error, engine_info, engine_trace, engine_warn};
use super::custom_renderer::{CustomRenderParams, CustomRenderer, CustomRendererRegistry};
use super::render_command::{
    ControlCommand, RenderPass, VIEWPORT_FULLSCREEN, VIEWPORT_LIGHT,
};
use super::light_manager::{LightId, LightManager};
use super::render_command_list::RenderCommandList;
use super::render_objects::{RenderObjectId, RenderObjects};
use super::render_order::{DecodedKey, RenderOrderData, CALLBACK_MATERIAL};

/// Viewports rendered every frame
const VIEWPORT_COUNT: usize = 2;

/// Distance of the light eye from the origin along its inverse direction
const LIGHT_DISTANCE: f32 = 10.0;

// Lighting shader uniforms
const U_GBUFFER_NORMAL: &str = "g_norm";
const U_GBUFFER_ALBEDO_SPECULAR: &str = "g_alb_spec";
const U_GBUFFER_DEPTH: &str = "g_depth";
const U_SHADOW_DEPTH: &str = "shadow_depth";
const U_LIGHT_INVERSE_DIR: &str = "light.inverse_dir";
const U_LIGHT_COLOR: &str = "light.color";
const U_HALF_NEAR_PLANE: &str = "half_near_plane";
const U_PROJECTION: &str = "pers_mat";
const U_SHADOW_MATRIX: &str = "shadow_mat";

// ===== CONFIGURATION =====

/// Directional light casting the shadow map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector pointing towards the light
    pub inverse_direction: Vec3,
    /// Eye position of the shadow viewport
    pub position: Vec3,
    pub color: Vec3,
}

impl DirectionalLight {
    pub fn new(inverse_direction: Vec3, color: Vec3) -> Self {
        let inverse_direction = inverse_direction.normalize();
        Self {
            inverse_direction,
            position: inverse_direction * LIGHT_DISTANCE,
            color,
        }
    }

    /// Direction the light travels in
    pub fn direction(&self) -> Vec3 {
        -self.inverse_direction
    }

    /// World transform of the shadow viewport eye
    pub fn transform(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), Vec3::Y).inverse()
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vec3::new(0.282166332, 0.846498966, 0.451466143), Vec3::ONE)
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    /// Width and height of the square shadow map
    pub shadow_map_resolution: u32,
    /// Render-object slots allocated up front
    pub initial_object_capacity: u32,
    pub light: DirectionalLight,
    pub light_projection: ProjectionParameters,
    pub clear_color: Vec4,
    /// Return `Error::IncompleteFramebuffer` from `initialize` instead of
    /// only logging it
    pub fail_on_incomplete_framebuffer: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            framebuffer_width: 1280,
            framebuffer_height: 720,
            shadow_map_resolution: 1024,
            initial_object_capacity: 512,
            light: DirectionalLight::default(),
            light_projection: ProjectionParameters::orthographic(24.0, 1.0, 0.0, 20.0),
            clear_color: Vec4::ZERO,
            fail_on_incomplete_framebuffer: cfg!(debug_assertions),
        }
    }
}

/// Resources of the shadow and lighting passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightingAssets {
    /// Fullscreen deferred lighting program
    pub lighting_shader: ShaderId,
    /// Material every object is drawn with into the shadow map
    pub shadow_material: MaterialId,
    /// Quad covering the screen
    pub fullscreen_mesh: MeshId,
}

// ===== GPU TARGETS =====

#[derive(Debug, Clone, Copy)]
struct GBuffer {
    framebuffer: u32,
    normal: u32,
    albedo_specular: u32,
    depth: u32,
}

#[derive(Debug, Clone, Copy)]
struct ShadowMap {
    framebuffer: u32,
    depth: u32,
}

#[derive(Debug, Clone, Copy)]
struct RenderTargets {
    gbuffer: GBuffer,
    shadow: ShadowMap,
    assets: LightingAssets,
}

/// Driver objects created by an `initialize` still in progress
///
/// Released when initialization fails so nothing outlives the error.
#[derive(Debug, Default)]
struct CreatedTargets {
    textures: Vec<u32>,
    framebuffers: Vec<u32>,
}

impl CreatedTargets {
    fn texture(&mut self, texture: u32) -> u32 {
        self.textures.push(texture);
        texture
    }

    fn framebuffer(&mut self, framebuffer: u32) -> u32 {
        self.framebuffers.push(framebuffer);
        framebuffer
    }

    fn release(&self, device: &mut dyn GraphicsDevice) {
        for &framebuffer in &self.framebuffers {
            if let Err(err) = device.delete_framebuffer(framebuffer) {
                engine_warn!("lumen3d::Renderer", "Framebuffer {} not released: {}", framebuffer, err);
            }
        }
        for &texture in &self.textures {
            if let Err(err) = device.delete_texture(texture) {
                engine_warn!("lumen3d::Renderer", "Texture {} not released: {}", texture, err);
            }
        }
    }
}

/// Eye used by a frame: world transform plus projection
#[derive(Debug, Clone, Copy)]
struct FrameCamera {
    transform: Mat4,
    parameters: ProjectionParameters,
}

fn lock<'a, T: ?Sized>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| engine_err!("lumen3d::Renderer", "{} lock poisoned", what))
}

// ===== RENDERER =====

pub struct Renderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    resources: Arc<Mutex<ResourceManager>>,
    config: RendererConfig,

    objects: RenderObjects,
    lights: LightManager,
    command_list: RenderCommandList,
    custom_renderers: CustomRendererRegistry,
    targets: Option<RenderTargets>,

    viewport_transforms: [ViewportTransform; VIEWPORT_COUNT],
    visibility: [BitPackSet; VIEWPORT_COUNT],
    /// Point and spot lights inside the culling frustum of the last frame
    visible_lights: Vec<LightId>,

    override_render_camera: Option<Entity>,
    override_culling_camera: Option<Entity>,
    lock_culling_camera: bool,
    culling_camera_transform: Mat4,
    /// Render camera of the frame being built
    render_camera: FrameCamera,
}

impl Renderer {
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        resources: Arc<Mutex<ResourceManager>>,
        config: RendererConfig,
    ) -> Self {
        let objects = RenderObjects::new(config.initial_object_capacity);
        Self {
            device,
            resources,
            config,
            objects,
            lights: LightManager::default(),
            command_list: RenderCommandList::new(),
            custom_renderers: CustomRendererRegistry::new(),
            targets: None,
            viewport_transforms: [ViewportTransform::default(); VIEWPORT_COUNT],
            visibility: [BitPackSet::default(), BitPackSet::default()],
            visible_lights: Vec::new(),
            override_render_camera: None,
            override_culling_camera: None,
            lock_culling_camera: false,
            culling_camera_transform: Mat4::IDENTITY,
            render_camera: FrameCamera {
                transform: Mat4::IDENTITY,
                parameters: ProjectionParameters::default(),
            },
        }
    }

    // ===== SETUP =====

    /// Create the G-buffer and shadow map, and record the lighting assets
    ///
    /// Calling it again releases the previous targets first.
    pub fn initialize(&mut self, assets: LightingAssets) -> Result<()> {
        {
            let resources = lock(&self.resources, "Resource manager")?;
            if resources.shaders.shader(assets.lighting_shader).is_none() {
                return Err(Error::InvalidResource(format!(
                    "Lighting shader {} not found",
                    assets.lighting_shader.0
                )));
            }
            if resources.materials.material(assets.shadow_material).is_none() {
                return Err(Error::InvalidResource(format!(
                    "Shadow material {} not found",
                    assets.shadow_material.0
                )));
            }
            if resources.meshes.mesh(assets.fullscreen_mesh).is_none() {
                return Err(Error::InvalidResource(format!(
                    "Fullscreen mesh {} not found",
                    assets.fullscreen_mesh.0
                )));
            }
        }

        self.shutdown()?;

        let device = Arc::clone(&self.device);
        let mut device = lock(&device, "Graphics device")?;
        let mut created = CreatedTargets::default();
        let (gbuffer, shadow) = match self.create_targets(&mut *device, &mut created) {
            Ok(targets) => targets,
            Err(err) => {
                created.release(&mut *device);
                return Err(err);
            }
        };
        self.targets = Some(RenderTargets { gbuffer, shadow, assets });

        engine_info!(
            "lumen3d::Renderer",
            "Renderer initialized ({}x{}, shadow map {})",
            self.config.framebuffer_width,
            self.config.framebuffer_height,
            self.config.shadow_map_resolution
        );
        Ok(())
    }

    fn create_targets(
        &self,
        device: &mut dyn GraphicsDevice,
        created: &mut CreatedTargets,
    ) -> Result<(GBuffer, ShadowMap)> {
        let gbuffer = self.create_gbuffer(device, created)?;
        let shadow = self.create_shadow_map(device, created)?;
        Ok((gbuffer, shadow))
    }

    fn create_gbuffer(&self, device: &mut dyn GraphicsDevice, created: &mut CreatedTargets) -> Result<GBuffer> {
        let (width, height) = (self.config.framebuffer_width, self.config.framebuffer_height);
        let color = |format| TextureDesc {
            width,
            height,
            format,
            filter: Filter::Nearest,
            clamp_to_edge: false,
            depth_compare: false,
        };

        let normal = created.texture(device.create_texture(&color(TextureFormat::R16G16B16_SFLOAT))?);
        let albedo_specular = created.texture(device.create_texture(&color(TextureFormat::R8G8B8A8_UNORM))?);
        let depth = created.texture(device.create_texture(&color(TextureFormat::D32_FLOAT))?);
        let framebuffer = created.framebuffer(device.create_framebuffer(&FramebufferDesc {
            color_attachments: vec![normal, albedo_specular],
            depth_attachment: Some(depth),
        })?);
        engine_debug!("lumen3d::Renderer", "G-buffer framebuffer {} created", framebuffer);

        self.check_framebuffer(device, framebuffer, "G-buffer")?;
        Ok(GBuffer { framebuffer, normal, albedo_specular, depth })
    }

    fn create_shadow_map(&self, device: &mut dyn GraphicsDevice, created: &mut CreatedTargets) -> Result<ShadowMap> {
        let resolution = self.config.shadow_map_resolution;
        let depth = created.texture(device.create_texture(&TextureDesc {
            width: resolution,
            height: resolution,
            format: TextureFormat::D32_FLOAT,
            filter: Filter::Linear,
            clamp_to_edge: true,
            depth_compare: true,
        })?);
        let framebuffer = created.framebuffer(device.create_framebuffer(&FramebufferDesc {
            color_attachments: Vec::new(),
            depth_attachment: Some(depth),
        })?);
        engine_debug!("lumen3d::Renderer", "Shadow map framebuffer {} created", framebuffer);

        self.check_framebuffer(device, framebuffer, "Shadow map")?;
        Ok(ShadowMap { framebuffer, depth })
    }

    fn check_framebuffer(&self, device: &mut dyn GraphicsDevice, framebuffer: u32, name: &str) -> Result<()> {
        if device.is_framebuffer_complete(framebuffer)? {
            return Ok(());
        }
        engine_error!("lumen3d::Renderer", "{} framebuffer {} is incomplete", name, framebuffer);
        if self.config.fail_on_incomplete_framebuffer {
            return Err(Error::IncompleteFramebuffer(name.to_string()));
        }
        Ok(())
    }

    /// Delete the G-buffer and shadow map
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(targets) = self.targets.take() else {
            return Ok(());
        };
        let mut device = lock(&self.device, "Graphics device")?;
        device.delete_framebuffer(targets.gbuffer.framebuffer)?;
        device.delete_texture(targets.gbuffer.normal)?;
        device.delete_texture(targets.gbuffer.albedo_specular)?;
        device.delete_texture(targets.gbuffer.depth)?;
        device.delete_framebuffer(targets.shadow.framebuffer)?;
        device.delete_texture(targets.shadow.depth)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.targets.is_some()
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_light(&mut self, light: DirectionalLight) {
        self.config.light = light;
    }

    // ===== RENDER OBJECTS =====

    pub fn add_render_object(&mut self, entity: Entity) -> RenderObjectId {
        self.objects.add_render_object(entity)
    }

    pub fn add_render_objects(&mut self, entities: &[Entity]) -> Vec<RenderObjectId> {
        self.objects.add_render_objects(entities)
    }

    pub fn lookup(&self, entity: Entity) -> RenderObjectId {
        self.objects.lookup(entity)
    }

    pub fn set_mesh_id(&mut self, id: RenderObjectId, mesh: MeshId) -> Result<()> {
        let resources = lock(&self.resources, "Resource manager")?;
        self.objects.set_mesh_id(id, mesh, &resources.meshes)
    }

    pub fn mesh_id(&self, id: RenderObjectId) -> Option<MeshId> {
        self.objects.mesh_id(id)
    }

    pub fn set_order_data(&mut self, id: RenderObjectId, order: RenderOrderData) -> Result<()> {
        self.objects.set_order_data(id, order)
    }

    pub fn order_data(&self, id: RenderObjectId) -> Option<RenderOrderData> {
        self.objects.order_data(id)
    }

    pub fn render_objects(&self) -> &RenderObjects {
        &self.objects
    }

    /// Store new world transforms of entities with a render object
    pub fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) -> Result<()> {
        let resources = lock(&self.resources, "Resource manager")?;
        self.objects.notify_updated_transforms(entities, transforms, &resources.meshes);
        self.lights.notify_updated_transforms(entities, transforms);
        Ok(())
    }

    // ===== LIGHTS =====

    /// Add a light for `entity`; configure it through `lights_mut`
    pub fn add_light(&mut self, entity: Entity) -> LightId {
        self.lights.add_light(entity)
    }

    pub fn lights(&self) -> &LightManager {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightManager {
        &mut self.lights
    }

    /// Point and spot lights touching the culling frustum of the last
    /// prepared frame
    pub fn visible_lights(&self) -> &[LightId] {
        &self.visible_lights
    }

    // ===== CAMERAS =====

    /// Freeze the culling frustum at the current culling camera transform
    pub fn set_lock_culling_camera(&mut self, locked: bool) {
        self.lock_culling_camera = locked;
    }

    pub fn is_culling_camera_locked(&self) -> bool {
        self.lock_culling_camera
    }

    /// Culling camera transform of the last unlocked frame
    pub fn culling_camera_transform(&self) -> Mat4 {
        self.culling_camera_transform
    }

    /// Render from `camera` instead of the scene's active camera
    pub fn set_override_render_camera(&mut self, camera: Option<Entity>) {
        self.override_render_camera = camera;
    }

    /// Cull with `camera` instead of the scene's active camera
    pub fn set_override_culling_camera(&mut self, camera: Option<Entity>) {
        self.override_culling_camera = camera;
    }

    // ===== CUSTOM RENDERERS =====

    pub fn add_custom_renderer(&mut self, renderer: Box<dyn CustomRenderer>) -> u32 {
        self.custom_renderers.add(renderer)
    }

    pub fn remove_custom_renderer(&mut self, index: u32) -> Option<Box<dyn CustomRenderer>> {
        self.custom_renderers.remove(index)
    }

    // ===== FRAME STATE =====

    pub fn command_list(&self) -> &RenderCommandList {
        &self.command_list
    }

    pub fn viewport_transform(&self, viewport: u32) -> Option<&ViewportTransform> {
        self.viewport_transforms.get(viewport as usize)
    }

    /// Visibility bits of the last prepared frame, indexed by render object
    pub fn visibility(&self, viewport: u32) -> Option<&BitPackSet> {
        self.visibility.get(viewport as usize)
    }

    // ===== FRAME =====

    /// Build, sort, replay and clear one frame
    pub fn render(&mut self, scene: &mut Scene) -> Result<()> {
        if let Err(err) = self.prepare_frame(scene) {
            self.command_list.clear();
            return Err(err);
        }
        self.submit_frame()
    }

    fn resolve_camera(scene: &Scene, entity: Option<Entity>, role: &str) -> Result<FrameCamera> {
        let camera = entity.and_then(|e| Some((scene.camera(e)?, scene.world_transform(e)?)));
        match camera {
            Some((camera, transform)) => Ok(FrameCamera { transform, parameters: camera.parameters }),
            None => Err(Error::InvalidResource(format!("No {} camera in the scene", role))),
        }
    }

    /// Cull and build the sorted command list of a frame
    ///
    /// Returns the number of object draw commands.
    pub fn prepare_frame(&mut self, scene: &mut Scene) -> Result<u32> {
        let Some(targets) = self.targets else {
            return Err(Error::InitializationFailed("Renderer not initialized".to_string()));
        };
        self.command_list.clear();

        // Cameras
        let active = scene.active_camera();
        let render_camera = Self::resolve_camera(scene, self.override_render_camera.or(active), "render")?;
        let culling_camera = Self::resolve_camera(scene, self.override_culling_camera.or(active), "culling")?;
        self.render_camera = render_camera;

        if let Some(skybox) = scene.skybox() {
            let eye = Camera::position(&render_camera.transform);
            scene.set_world_transform(skybox, Mat4::from_translation(eye));
        }

        // Transforms
        {
            let resources = lock(&self.resources, "Resource manager")?;
            let mut updater = TransformUpdater {
                objects: &mut self.objects,
                lights: &mut self.lights,
                resources: &resources,
            };
            scene.notify_updated_transforms(&mut updater);
        }

        // Viewport matrices
        let light_transform = self.config.light.transform();
        let light_params = self.config.light_projection;
        self.viewport_transforms[VIEWPORT_LIGHT as usize] =
            ViewportTransform::from_transform(&light_transform, &light_params);
        self.viewport_transforms[VIEWPORT_FULLSCREEN as usize] =
            ViewportTransform::from_transform(&render_camera.transform, &render_camera.parameters);

        // Visibility
        if !self.lock_culling_camera {
            self.culling_camera_transform = culling_camera.transform;
        }
        let frustums = [
            Frustum::from_parameters(&light_params, &light_transform),
            Frustum::from_parameters(&culling_camera.parameters, &self.culling_camera_transform),
        ];
        let count = self.objects.count();
        for (visibility, frustum) in self.visibility.iter_mut().zip(&frustums) {
            visibility.reset(count);
            intersect::frustum_aabb(frustum, count, self.objects.all_bounds(), visibility.packs_mut());
        }
        self.lights.non_directional_lights_within_frustum(
            &frustums[VIEWPORT_FULLSCREEN as usize],
            &mut self.visible_lights,
        );

        // Commands
        self.add_pass_controls(&targets);
        let draws = self.add_object_draws(&targets, &light_transform, &render_camera);
        for (index, pass) in self.custom_renderers.passes() {
            self.command_list.add_draw_with_callback(VIEWPORT_FULLSCREEN, pass, 0.0, index);
        }

        self.command_list.sort();
        engine_trace!(
            "lumen3d::Renderer",
            "Frame prepared: {} commands, {} object draws, {} visible lights",
            self.command_list.len(),
            draws,
            self.visible_lights.len()
        );
        Ok(draws)
    }

    /// GPU state at each pass boundary
    fn add_pass_controls(&mut self, targets: &RenderTargets) {
        let shadow_size = self.config.shadow_map_resolution as i32;
        let screen = Rect {
            x: 0,
            y: 0,
            width: self.config.framebuffer_width as i32,
            height: self.config.framebuffer_height as i32,
        };
        let list = &mut self.command_list;

        let light_geometry = [
            ControlCommand::DepthTestEnable,
            ControlCommand::DepthTestFunction(DepthFunction::Less),
            ControlCommand::DepthWriteEnable,
            ControlCommand::CullFaceEnable,
            ControlCommand::CullFaceBack,
            ControlCommand::ClearDepth(1.0),
            ControlCommand::BlendingDisable,
            ControlCommand::Viewport(Rect { x: 0, y: 0, width: shadow_size, height: shadow_size }),
            ControlCommand::BindFramebuffer {
                target: FramebufferTarget::Framebuffer,
                framebuffer: targets.shadow.framebuffer,
            },
            ControlCommand::Clear(ClearMask::DEPTH),
        ];
        let fullscreen_geometry = [
            ControlCommand::ClearColor(self.config.clear_color),
            ControlCommand::Viewport(screen),
            ControlCommand::BindFramebuffer {
                target: FramebufferTarget::Framebuffer,
                framebuffer: targets.gbuffer.framebuffer,
            },
            ControlCommand::Clear(ClearMask::COLOR | ClearMask::DEPTH),
        ];
        let fullscreen_lighting = [
            ControlCommand::BindFramebuffer { target: FramebufferTarget::Framebuffer, framebuffer: 0 },
            ControlCommand::Clear(ClearMask::COLOR | ClearMask::DEPTH),
            ControlCommand::DepthTestFunction(DepthFunction::Always),
        ];
        let fullscreen_skybox = [
            ControlCommand::DepthTestFunction(DepthFunction::Equal),
            ControlCommand::DepthWriteDisable,
        ];
        let fullscreen_transparent = [
            ControlCommand::DepthTestFunction(DepthFunction::Less),
            ControlCommand::BlendingEnable,
        ];

        let blocks: [(u32, RenderPass, &[ControlCommand]); 5] = [
            (VIEWPORT_LIGHT, RenderPass::OpaqueGeometry, &light_geometry),
            (VIEWPORT_FULLSCREEN, RenderPass::OpaqueGeometry, &fullscreen_geometry),
            (VIEWPORT_FULLSCREEN, RenderPass::OpaqueLighting, &fullscreen_lighting),
            (VIEWPORT_FULLSCREEN, RenderPass::Skybox, &fullscreen_skybox),
            (VIEWPORT_FULLSCREEN, RenderPass::Transparent, &fullscreen_transparent),
        ];
        for (viewport, pass, commands) in blocks {
            for (order, command) in commands.iter().enumerate() {
                list.add_control(viewport, pass, order as u32, *command);
            }
        }

        list.add_draw(VIEWPORT_FULLSCREEN, RenderPass::OpaqueLighting, 0.0, MaterialId::NULL, 0);
    }

    /// One draw per visible object and viewport
    fn add_object_draws(&mut self, targets: &RenderTargets, light_transform: &Mat4, camera: &FrameCamera) -> u32 {
        let light_eye = Camera::position(light_transform);
        let light_forward = Camera::forward(light_transform);
        let camera_eye = Camera::position(&camera.transform);
        let camera_forward = Camera::forward(&camera.transform);
        let transforms = self.objects.all_transforms();
        let orders = self.objects.all_orders();
        let mut draws = 0;

        for index in self.visibility[VIEWPORT_LIGHT as usize].iter_set().filter(|&i| i != 0) {
            let position = transforms[index as usize].w_axis.truncate();
            let depth = calculate_depth(position, light_eye, light_forward, &self.config.light_projection);
            self.command_list.add_draw(
                VIEWPORT_LIGHT,
                RenderPass::OpaqueGeometry,
                depth,
                targets.assets.shadow_material,
                index,
            );
            draws += 1;
        }

        for index in self.visibility[VIEWPORT_FULLSCREEN as usize].iter_set().filter(|&i| i != 0) {
            let position = transforms[index as usize].w_axis.truncate();
            let depth = calculate_depth(position, camera_eye, camera_forward, &camera.parameters);
            let order = orders[index as usize];
            self.command_list.add_draw(VIEWPORT_FULLSCREEN, order.transparency, depth, order.material, index);
            draws += 1;
        }

        draws
    }

    /// Replay the prepared command list, then clear it
    ///
    /// The list is cleared even when replay fails.
    pub fn submit_frame(&mut self) -> Result<()> {
        let result = self.replay();
        self.command_list.clear();
        result
    }

    fn replay(&mut self) -> Result<()> {
        let Some(targets) = self.targets else {
            return Err(Error::InitializationFailed("Renderer not initialized".to_string()));
        };
        let mut device = lock(&self.device, "Graphics device")?;
        let device: &mut dyn GraphicsDevice = &mut *device;
        let resources = lock(&self.resources, "Resource manager")?;

        for &key in self.command_list.keys() {
            match DecodedKey::decode(key) {
                DecodedKey::Control { opcode, data, .. } => {
                    self.command_list.control_command(opcode, data)?.apply(device)?;
                }
                DecodedKey::Draw { viewport, pass, material, render_object, .. } => {
                    let Some(viewport_transform) = self.viewport_transforms.get(viewport as usize) else {
                        engine_warn!("lumen3d::Renderer", "Draw in unknown viewport {} skipped", viewport);
                        continue;
                    };

                    if material as u64 == CALLBACK_MATERIAL {
                        let Some(custom) = self.custom_renderers.get_mut(render_object) else {
                            engine_warn!(
                                "lumen3d::Renderer",
                                "Custom renderer {} was removed, draw skipped",
                                render_object
                            );
                            continue;
                        };
                        let params = CustomRenderParams {
                            viewport,
                            pass: RenderPass::try_from(pass)?,
                            callback: render_object,
                            transform: viewport_transform,
                        };
                        custom.render_custom(&params, device)?;
                    } else if pass == RenderPass::OpaqueLighting.id() {
                        draw_lighting(
                            device,
                            &resources,
                            &targets,
                            &self.config,
                            &self.viewport_transforms,
                            &self.render_camera,
                        )?;
                    } else {
                        let id = RenderObjectId(render_object);
                        let (Some(mesh), Some(model)) = (self.objects.mesh_id(id), self.objects.transform(id)) else {
                            engine_warn!("lumen3d::Renderer", "Render object {} not found, draw skipped", render_object);
                            continue;
                        };
                        draw_object(device, &resources, viewport_transform, MaterialId(material), mesh, model)?;
                    }
                }
            }
        }

        device.bind_vertex_array(0)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            engine_warn!("lumen3d::Renderer", "Render targets not released on drop: {}", err);
        }
    }
}

// ===== REPLAY =====

/// Routes scene transform notifications into the render-object and
/// light stores
struct TransformUpdater<'a> {
    objects: &'a mut RenderObjects,
    lights: &'a mut LightManager,
    resources: &'a ResourceManager,
}

impl TransformUpdateReceiver for TransformUpdater<'_> {
    fn notify_updated_transforms(&mut self, entities: &[Entity], transforms: &[Mat4]) {
        self.objects.notify_updated_transforms(entities, transforms, &self.resources.meshes);
        self.lights.notify_updated_transforms(entities, transforms);
    }
}

/// Bind the material's uniforms, textures on consecutive units from 0
fn bind_material(device: &mut dyn GraphicsDevice, textures: &TextureManager, material: &MaterialData) -> Result<()> {
    let mut unit = 0;
    for uniform in &material.uniforms {
        let location = uniform.location;
        match uniform.value {
            UniformValue::Tex2D(hash) | UniformValue::TexCube(hash) => {
                if let Some(texture) = textures.texture(hash) {
                    device.bind_texture(unit, texture.target, texture.driver_id)?;
                    device.set_uniform_int(location, unit as i32)?;
                    unit += 1;
                }
            }
            UniformValue::Mat4x4(value) => device.set_uniform_mat4(location, &value)?,
            UniformValue::Vec4(value) => device.set_uniform_vec4(location, value)?,
            UniformValue::Vec3(value) => device.set_uniform_vec3(location, value)?,
            UniformValue::Vec2(value) => device.set_uniform_vec2(location, value)?,
            UniformValue::Float(value) => device.set_uniform_float(location, value)?,
            UniformValue::Int(value) => device.set_uniform_int(location, value)?,
        }
    }
    Ok(())
}

/// Upload the standard transform uniforms the shader declares
fn upload_transforms(
    device: &mut dyn GraphicsDevice,
    shader: &ShaderData,
    viewport: &ViewportTransform,
    model: &Mat4,
) -> Result<()> {
    let slots = &shader.transforms;
    if let Some(location) = slots.mvp {
        device.set_uniform_mat4(location, &(viewport.view_projection * *model))?;
    }
    if let Some(location) = slots.mv {
        device.set_uniform_mat4(location, &(viewport.view * *model))?;
    }
    if let Some(location) = slots.vp {
        device.set_uniform_mat4(location, &viewport.view_projection)?;
    }
    if let Some(location) = slots.m {
        device.set_uniform_mat4(location, model)?;
    }
    if let Some(location) = slots.v {
        device.set_uniform_mat4(location, &viewport.view)?;
    }
    if let Some(location) = slots.p {
        device.set_uniform_mat4(location, &viewport.projection)?;
    }
    Ok(())
}

fn draw_object(
    device: &mut dyn GraphicsDevice,
    resources: &ResourceManager,
    viewport: &ViewportTransform,
    material_id: MaterialId,
    mesh_id: MeshId,
    model: &Mat4,
) -> Result<()> {
    let Some(material) = resources.materials.material(material_id) else {
        engine_warn!("lumen3d::Renderer", "Material {} not found, draw skipped", material_id.0);
        return Ok(());
    };
    let Some(shader) = resources.shaders.shader(material.shader) else {
        engine_warn!("lumen3d::Renderer", "Shader {} not found, draw skipped", material.shader.0);
        return Ok(());
    };
    let Some(mesh) = resources.meshes.draw_data(mesh_id) else {
        engine_warn!("lumen3d::Renderer", "Mesh {} not found, draw skipped", mesh_id.0);
        return Ok(());
    };
    let missing_texture = material.uniforms.iter().find_map(|uniform| match uniform.value {
        UniformValue::Tex2D(hash) | UniformValue::TexCube(hash)
            if resources.textures.texture(hash).is_none() => Some(hash),
        _ => None,
    });
    if let Some(hash) = missing_texture {
        engine_warn!("lumen3d::Renderer", "Texture {:#010x} not found, draw skipped", hash);
        return Ok(());
    }

    device.use_program(shader.program)?;
    bind_material(device, &resources.textures, material)?;
    upload_transforms(device, shader, viewport, model)?;
    device.bind_vertex_array(mesh.vertex_array)?;
    device.draw_indexed(mesh.primitive_mode, mesh.index_count, mesh.index_type)
}

/// Fullscreen deferred lighting from the G-buffer and the shadow map
fn draw_lighting(
    device: &mut dyn GraphicsDevice,
    resources: &ResourceManager,
    targets: &RenderTargets,
    config: &RendererConfig,
    viewports: &[ViewportTransform; VIEWPORT_COUNT],
    camera: &FrameCamera,
) -> Result<()> {
    let Some(shader) = resources.shaders.shader(targets.assets.lighting_shader) else {
        engine_warn!("lumen3d::Renderer", "Lighting shader missing, lighting skipped");
        return Ok(());
    };
    let Some(quad) = resources.meshes.draw_data(targets.assets.fullscreen_mesh) else {
        engine_warn!("lumen3d::Renderer", "Fullscreen mesh missing, lighting skipped");
        return Ok(());
    };
    let light_viewport = &viewports[VIEWPORT_LIGHT as usize];
    let screen_viewport = &viewports[VIEWPORT_FULLSCREEN as usize];

    device.use_program(shader.program)?;

    let samplers = [
        (U_GBUFFER_NORMAL, targets.gbuffer.normal),
        (U_GBUFFER_ALBEDO_SPECULAR, targets.gbuffer.albedo_specular),
        (U_GBUFFER_DEPTH, targets.gbuffer.depth),
        (U_SHADOW_DEPTH, targets.shadow.depth),
    ];
    for (unit, (name, texture)) in samplers.iter().enumerate() {
        if let Some(location) = shader.uniform_location(name) {
            device.set_uniform_int(location, unit as i32)?;
        }
        device.bind_texture(unit as u32, TextureTarget::Texture2D, *texture)?;
    }

    // Light direction in view space
    if let Some(location) = shader.uniform_location(U_LIGHT_INVERSE_DIR) {
        let inverse_dir = screen_viewport.view * config.light.inverse_direction.extend(0.0);
        device.set_uniform_vec3(location, inverse_dir.truncate())?;
    }
    if let Some(location) = shader.uniform_location(U_LIGHT_COLOR) {
        device.set_uniform_vec3(location, config.light.color)?;
    }
    if let Some(location) = shader.uniform_location(U_HALF_NEAR_PLANE) {
        let half_height = (camera.parameters.height * 0.5).tan();
        device.set_uniform_vec2(location, Vec2::new(half_height * camera.parameters.aspect, half_height))?;
    }
    if let Some(location) = shader.uniform_location(U_PROJECTION) {
        device.set_uniform_mat4(location, &screen_viewport.projection)?;
    }
    if let Some(location) = shader.uniform_location(U_SHADOW_MATRIX) {
        // Clip space [-1, 1] to texture space [0, 1]
        let bias = Mat4::from_translation(Vec3::splat(0.5)) * Mat4::from_scale(Vec3::splat(0.5));
        let shadow = bias * light_viewport.view_projection * camera.transform;
        device.set_uniform_mat4(location, &shadow)?;
    }

    device.bind_vertex_array(quad.vertex_array)?;
    device.draw_indexed(quad.primitive_mode, quad.index_count, quad.index_type)
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
