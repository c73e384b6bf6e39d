/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Separable kernel downscaling used to build mip levels
//!
//! Every channel is resampled on its own as a plane of `f64`, first
//! along rows and then along columns. When shrinking, the kernel is
//! stretched by the scale factor so every source pixel contributes.
use crate::format::PixelDescriptor;
use crate::sample::SampleKind;

/// Filter used to produce reduced mip levels
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum MipFilter {
    /// Triangle filter
    Bilinear,
    /// Mitchell-Netravali cubic, B = C = 1/3
    #[default]
    Bicubic,
    /// Catmull-Rom cubic, B = 0, C = 1/2
    CatmullRom,
    /// Lanczos with three lobes
    Lanczos3
}

impl MipFilter {
    fn kernel_and_radius(self) -> (fn(f64) -> f64, f64) {
        match self {
            MipFilter::Bilinear => (bilinear_kernel, 1.0),
            MipFilter::Bicubic => (|x| bicubic_kernel(x, 1.0 / 3.0, 1.0 / 3.0), 2.0),
            MipFilter::CatmullRom => (|x| bicubic_kernel(x, 0.0, 0.5), 2.0),
            MipFilter::Lanczos3 => (lanczos_kernel::<3>, 3.0)
        }
    }
}

struct ConvKernel {
    start:   usize,
    weights: Vec<f64>
}

fn precompute_kernels(in_size: usize, out_size: usize, filter: MipFilter) -> Vec<ConvKernel> {
    let (kernel_fn, radius) = filter.kernel_and_radius();

    let ratio = in_size as f64 / out_size as f64;
    let scale = ratio.max(1.0);
    let support = radius * scale;
    let last = in_size as f64 - 1.0;

    let mut kernels = Vec::with_capacity(out_size);

    for out_pos in 0..out_size {
        let src_pos = (out_pos as f64 + 0.5) * ratio - 0.5;

        let start = (src_pos - support).ceil().clamp(0.0, last) as usize;
        let end = (src_pos + support).floor().clamp(0.0, last) as usize;

        let mut weights = (start..=end)
            .map(|i| kernel_fn((i as f64 - src_pos) / scale))
            .collect::<Vec<_>>();
        let sum: f64 = weights.iter().sum();

        if sum.abs() > f64::EPSILON {
            weights.iter_mut().for_each(|w| *w /= sum);
        } else {
            // nothing in reach, take the nearest sample
            let nearest = src_pos.round().clamp(0.0, last) as usize;
            weights.iter_mut().for_each(|w| *w = 0.0);
            weights[nearest - start] = 1.0;
        }
        kernels.push(ConvKernel { start, weights });
    }
    kernels
}

#[inline]
fn convolve(kernel: &ConvKernel, mut sample: impl FnMut(usize) -> f64) -> f64 {
    kernel
        .weights
        .iter()
        .enumerate()
        .map(|(i, w)| sample(kernel.start + i) * w)
        .sum()
}

/// Resample a single plane to `out_width` x `out_height`
pub(crate) fn resample_plane(
    input: &[f64], in_width: usize, in_height: usize, out_width: usize, out_height: usize,
    filter: MipFilter
) -> Vec<f64> {
    let horizontal = if in_width == out_width {
        input.to_vec()
    } else {
        let kernels = precompute_kernels(in_width, out_width, filter);
        let mut out = Vec::with_capacity(out_width * in_height);
        for row in input.chunks_exact(in_width) {
            out.extend(kernels.iter().map(|k| convolve(k, |x| row[x])));
        }
        out
    };

    if in_height == out_height {
        return horizontal;
    }
    let kernels = precompute_kernels(in_height, out_height, filter);
    let mut out = Vec::with_capacity(out_width * out_height);
    for kernel in &kernels {
        for x in 0..out_width {
            out.push(convolve(kernel, |y| horizontal[y * out_width + x]));
        }
    }
    out
}

/// Split an interleaved raster into one plane per channel
pub(crate) fn deinterleave(
    src: &[u8], stride: usize, width: usize, height: usize, descriptor: &PixelDescriptor
) -> Vec<Vec<f64>> {
    let kind = SampleKind::from_descriptor(descriptor);
    let channels = descriptor.num_channels();
    let size = kind.size();

    let mut planes = vec![Vec::with_capacity(width * height); channels];
    for row in src.chunks(stride).take(height) {
        for pixel in row[..width * channels * size].chunks_exact(channels * size) {
            for (plane, sample) in planes.iter_mut().zip(pixel.chunks_exact(size)) {
                plane.push(kind.read(sample));
            }
        }
    }
    planes
}

/// Produce a reduced copy of `planes` in `out`, interleaved and
/// converted back to the stored sample type
#[allow(clippy::too_many_arguments)]
pub(crate) fn resample_into(
    planes: &[Vec<f64>], width: usize, height: usize, descriptor: &PixelDescriptor,
    out: &mut [u8], out_width: usize, out_height: usize, out_pitch: usize, filter: MipFilter
) -> Result<(), String> {
    let kind = SampleKind::from_descriptor(descriptor);
    let channels = descriptor.num_channels();
    let size = kind.size();

    if width == 0 || height == 0 || out_width == 0 || out_height == 0 {
        return Err(format!(
            "cannot resample {width}x{height} to {out_width}x{out_height}"
        ));
    }
    if planes.len() != channels || planes.iter().any(|p| p.len() != width * height) {
        return Err("source planes do not match the image".to_string());
    }
    if out_pitch < out_width * channels * size || out.len() < out_pitch * out_height {
        return Err(format!(
            "output of {} bytes cannot hold a {out_width}x{out_height} image",
            out.len()
        ));
    }

    for (c, plane) in planes.iter().enumerate() {
        let reduced = resample_plane(plane, width, height, out_width, out_height, filter);

        for (row, values) in out.chunks_mut(out_pitch).zip(reduced.chunks_exact(out_width)) {
            for (x, value) in values.iter().enumerate() {
                let pos = (x * channels + c) * size;
                kind.write(*value, &mut row[pos..pos + size]);
            }
        }
    }
    Ok(())
}

/// Lanczos kernel with parameter a
#[inline]
fn lanczos_kernel<const A: i32>(x: f64) -> f64 {
    let x = x.abs();

    if x < 1e-9 {
        return 1.0;
    }
    let a = f64::from(A);

    if x < a {
        let pi_x = std::f64::consts::PI * x;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Mitchell-Netravali family of cubics
#[inline]
fn bicubic_kernel(x: f64, b: f64, c: f64) -> f64 {
    let x = x.abs();

    if x < 1.0 {
        let x2 = x * x;
        let x3 = x2 * x;
        ((12.0 - 9.0 * b - 6.0 * c) * x3 + (-18.0 + 12.0 * b + 6.0 * c) * x2 + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        let x2 = x * x;
        let x3 = x2 * x;
        ((-b - 6.0 * c) * x3
            + (6.0 * b + 30.0 * c) * x2
            + (-12.0 * b - 48.0 * c) * x
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn bilinear_kernel(x: f64) -> f64 {
    let x = x.abs();

    if x < 1.0 {
        1.0 - x
    } else {
        0.0
    }
}
