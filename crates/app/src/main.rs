//! Entry point for Ghost3D: load the model/texture pair, hand the buffers
//! to the graphics device, and serve rotation control packets.

use std::time::Duration;

use anyhow::Result;
use asset::{LoadOptions, load_bmp_from_path, load_obj_from_path};
use control::{ControlEvent, ControlServer};
use corelib::camera::Camera;
use corelib::transform::Transform;
use gfx::{GraphicsDevice, HeadlessDevice, MeshHandle, SharedRotation, TextureHandle};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn parse_string_arg(name: &str, default: &str) -> String {
    let prefix = format!("--{name}=");
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            return val.to_string();
        }
    }
    default.to_string()
}

fn parse_port_arg() -> u16 {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--port=") {
            match val.parse::<u16>() {
                Ok(port) => return port,
                Err(_) => eprintln!("[warn] Invalid port '{val}', using default."),
            }
        }
    }
    control::CONTROL_PORT
}

fn parse_strict_eol_arg() -> bool {
    std::env::args().any(|arg| arg == "--strict-eol")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model_path = parse_string_arg("model", "Models/Gun.obj");
    let texture_path = parse_string_arg("texture", "Textures/grid.bmp");
    let port = parse_port_arg();
    let options = LoadOptions {
        strict_eol: parse_strict_eol_arg(),
    };
    log::info!("Starting Ghost3D. model={model_path}, texture={texture_path}, port={port}");

    let mut device = HeadlessDevice::new();

    // A failed load is diagnosed and leaves a null handle; the frame loop
    // treats null handles as "nothing to draw".
    let mesh_handle = match load_obj_from_path(&model_path, &options) {
        Ok(mesh) => device.upload_mesh(&mesh),
        Err(e) => {
            log::error!("mesh load failed: {e}");
            MeshHandle::NULL
        }
    };
    let texture_handle = match load_bmp_from_path(&texture_path) {
        Ok(texture) => device.upload_texture(&texture),
        Err(e) => {
            log::error!("texture load failed: {e}");
            TextureHandle::NULL
        }
    };

    let mut server = ControlServer::bind(("0.0.0.0", port))?;
    let rotation = SharedRotation::new(0.0);
    let camera = Camera::default_view();

    loop {
        while let Some(event) = server.poll() {
            match event {
                ControlEvent::Discovery(addr) => log::info!("controller connected from {addr}"),
                ControlEvent::Orientation { roll, .. } => rotation.set(roll),
            }
        }

        let model = Transform::spin_y(rotation.get()).matrix();
        device.draw(mesh_handle, texture_handle, model, camera.proj_view());

        std::thread::sleep(FRAME_INTERVAL);
    }
}
