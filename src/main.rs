// Copyright 2020 TwoCookingMice

use madeleine::core::scene::Scene;
use madeleine::emitters::envmap::EnvironmentEmitter;
use madeleine::emitters::point::PointEmitter;
use madeleine::core::emitter::Emitter;
use madeleine::integrators::path::PathIntegrator;
use madeleine::io::exr_utils;
use madeleine::materials::lambertian_diffuse::LambertianDiffuseBSDF;
use madeleine::materials::mirror::MirrorBSDF;
use madeleine::math::constants::{ Float, Vector3f };
use madeleine::math::spectrum::RGBSpectrum;
use madeleine::renderers::simple::{ SimpleRenderer, Renderer };
use madeleine::sensors::perspective::PerspectiveCamera;
use madeleine::shapes::rectangle::Rectangle;
use madeleine::shapes::sphere::Sphere;

use std::env;
use std::str::FromStr;
use std::sync::Arc;

struct Settings {
    envmap_path: String,
    output_path: String,
    spp: u32,
    max_depth: u32,
    rr_depth: u32,
    seed: u64,
    scale: Float,
    width: usize,
    height: usize,
}

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>, default: T) -> T {
    match value.and_then(|v| v.parse::<T>().ok()) {
        Some(v) => v,
        None => {
            log::warn!("Missing or invalid value for {}, keeping the default.", flag);
            default
        }
    }
}

fn parse_settings(args: &[String]) -> Option<Settings> {
    if args.len() < 3 {
        return None;
    }

    let mut settings = Settings {
        envmap_path: args[1].clone(),
        output_path: args[2].clone(),
        spp: 16,
        max_depth: 8,
        rr_depth: 3,
        seed: 0,
        scale: 1.0,
        width: 512,
        height: 384,
    };

    let mut i = 3;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args.get(i + 1);
        match flag {
            "--spp" => settings.spp = parse_value(flag, value, settings.spp),
            "--max-depth" => settings.max_depth = parse_value(flag, value, settings.max_depth),
            "--rr-depth" => settings.rr_depth = parse_value(flag, value, settings.rr_depth),
            "--seed" => settings.seed = parse_value(flag, value, settings.seed),
            "--scale" => settings.scale = parse_value(flag, value, settings.scale),
            "--width" => settings.width = parse_value(flag, value, settings.width),
            "--height" => settings.height = parse_value(flag, value, settings.height),
            _ => {
                log::warn!("Ignoring unknown argument {}.", flag);
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Some(settings)
}

// Ground plane, a diffuse and a mirror sphere, a small quad light and a
// point light, lit by the environment probe.
fn build_demo_scene(environment: EnvironmentEmitter) -> Scene {
    let mut scene = Scene::new();

    let grey = Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.6)));
    scene.add_named_shape("ground",
                          Arc::new(Rectangle::new(Vector3f::new(-10.0, -1.0, -14.0),
                                                  Vector3f::new(0.0, 0.0, 20.0),
                                                  Vector3f::new(20.0, 0.0, 0.0))),
                          grey.clone(), None);
    scene.add_named_shape("diffuse_sphere",
                          Arc::new(Sphere::new(Vector3f::new(-1.2, 0.0, -4.0), 1.0)),
                          Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::new(0.7, 0.3, 0.2))),
                          None);
    scene.add_named_shape("mirror_sphere",
                          Arc::new(Sphere::new(Vector3f::new(1.2, 0.0, -4.0), 1.0)),
                          Arc::new(MirrorBSDF::new(RGBSpectrum::splat(0.95))),
                          None);
    scene.add_named_shape("quad_light",
                          Arc::new(Rectangle::new(Vector3f::new(-0.5, 3.0, -4.5),
                                                  Vector3f::new(1.0, 0.0, 0.0),
                                                  Vector3f::new(0.0, 0.0, 1.0))),
                          grey, Some(RGBSpectrum::splat(8.0)));

    scene.add_emitter(Emitter::Point(PointEmitter::new(Vector3f::new(2.5, 3.0, -1.5),
                                                       RGBSpectrum::splat(6.0))));
    scene.add_env_emitter(environment);
    scene.finish_initialization();
    scene
}

fn run(settings: &Settings) -> Result<(), String> {
    let environment = EnvironmentEmitter::from_file(&settings.envmap_path, settings.scale)?;
    let scene = build_demo_scene(environment);

    let camera = PerspectiveCamera::new(Vector3f::new(0.0, 1.0, 2.0),
                                        Vector3f::new(0.0, 0.0, -4.0),
                                        Vector3f::new(0.0, 1.0, 0.0),
                                        (45.0 as Float).to_radians(),
                                        settings.width,
                                        settings.height);
    let integrator = Box::new(PathIntegrator::new(settings.max_depth, settings.rr_depth, settings.spp));
    let renderer = SimpleRenderer::new(integrator, settings.seed);

    let image = renderer.render(&scene, &camera);
    exr_utils::write_exr_to_file(&image, &settings.output_path)
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let settings = match parse_settings(&args) {
        Some(settings) => settings,
        None => {
            eprintln!("Usage: {} <envmap.{{exr,png,jpg}}> <output.exr> [--spp N] [--max-depth N] [--rr-depth N] [--seed N] [--scale S] [--width W] [--height H]",
                      args.get(0).map(String::as_str).unwrap_or("madeleine"));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
