// Copyright @yucwang 2021

use crate::core::integrator::Integrator;
use crate::core::sampler::{IndependentSampler, Sampler};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

pub use super::renderer::Renderer;

const BLOCK_SIZE: usize = 32;

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    pixels: Vec<RGBSpectrum>,
}

/// Splits the film into square blocks that worker threads pull from a
/// shared counter. Every pixel owns its own sampler stream.
pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    seed: u64,
    thread_count: usize,
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, seed: u64) -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { integrator, seed, thread_count }
    }

    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    fn render_block(&self, scene: &Scene, sensor: &dyn Sensor, spp: u32,
                    x0: usize, y0: usize, x1: usize, y1: usize) -> Block {
        let (width, height) = (sensor.width() as Float, sensor.height() as Float);
        let inv_spp = 1.0 / spp as Float;
        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                let mut sampler = IndependentSampler::for_pixel(self.seed, x, y);
                let mut color = RGBSpectrum::zero();
                for _ in 0..spp {
                    let jitter = sampler.next_2d();
                    let u = Vector2f::new((x as Float + jitter.x) / width,
                                          (y as Float + jitter.y) / height);
                    let ray = sensor.sample_ray(&u);
                    let li = self.integrator.li(scene, &mut sampler, &ray);
                    if li.is_finite() {
                        color += li;
                    } else {
                        log::debug!("Dropping non-finite sample at pixel ({}, {}).", x, y);
                    }
                }
                pixels.push(color * inv_spp);
            }
        }
        Block { x0, y0, x1, y1, pixels }
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor) -> Bitmap {
        let (width, height) = (sensor.width(), sensor.height());
        let mut output = Bitmap::new(width, height);
        if width == 0 || height == 0 {
            return output;
        }
        let spp = self.integrator.samples_per_pixel().max(1);

        let blocks_x = (width + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let blocks_y = (height + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let total_blocks = blocks_x * blocks_y;
        log::info!("Rendering {}x{} at {} spp on {} threads.", width, height, spp, self.thread_count);

        let progress = ProgressBar::new(total_blocks as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<Block>();

        thread::scope(|scope| {
            for _ in 0..self.thread_count {
                let tx = tx.clone();
                let next_block = &next_block;
                scope.spawn(move || {
                    loop {
                        let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                        if block_index >= total_blocks {
                            break;
                        }

                        let x0 = (block_index % blocks_x) * BLOCK_SIZE;
                        let y0 = (block_index / blocks_x) * BLOCK_SIZE;
                        let x1 = (x0 + BLOCK_SIZE).min(width);
                        let y1 = (y0 + BLOCK_SIZE).min(height);
                        let block = self.render_block(scene, sensor, spp, x0, y0, x1, y1);
                        if tx.send(block).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for block in rx.iter() {
                let block_width = block.x1 - block.x0;
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        output[(x, y)] = block.pixels[(x - block.x0) + block_width * (y - block.y0)];
                    }
                }
                progress.inc(1);
            }
        });

        progress.finish_and_clear();
        output
    }
}
