use crate::error::OcrError;
use image::{GrayImage, Luma};
use imageproc::filter::separable_filter_equal;

/// How the local mean around each pixel is weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMethod {
    /// Gaussian-weighted window
    #[default]
    Gaussian,
    /// Plain box mean over the window
    Mean,
}

/// Apply adaptive thresholding
/// Each pixel is compared against its local mean minus `bias`, which copes
/// with uneven lighting far better than a single global cutoff
pub fn apply(
    image: GrayImage,
    block_size: u32,
    bias: f32,
    method: ThresholdMethod,
) -> Result<GrayImage, OcrError> {
    let binarized = match method {
        ThresholdMethod::Gaussian => gaussian_threshold(&image, block_size, bias),
        ThresholdMethod::Mean => mean_threshold(&image, block_size, bias),
    };
    Ok(binarized)
}

/// Sigma of the Gaussian kernel matching a square block of `block_size`
fn gaussian_sigma(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized `block_size`-tap Gaussian, so the window covers exactly the
/// block rather than a radius derived from sigma
fn gaussian_kernel(block_size: u32) -> Vec<f32> {
    let sigma = gaussian_sigma(block_size);
    let radius = (block_size / 2) as i32;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

fn gaussian_local_mean(img: &GrayImage, block_size: u32) -> GrayImage {
    separable_filter_equal(img, &gaussian_kernel(block_size))
}

fn gaussian_threshold(img: &GrayImage, block_size: u32, bias: f32) -> GrayImage {
    let local_mean = gaussian_local_mean(img, block_size);

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let pixel = img.get_pixel(x, y).0[0] as f32;
        let threshold = local_mean.get_pixel(x, y).0[0] as f32 - bias;
        binarize(pixel, threshold)
    })
}

fn mean_threshold(img: &GrayImage, block_size: u32, bias: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let half_window = block_size as i32 / 2;

    // Precompute integral image for efficient window sums
    let integral = compute_integral_image(img);

    GrayImage::from_fn(width, height, |x, y| {
        let x1 = (x as i32 - half_window).max(0) as u32;
        let y1 = (y as i32 - half_window).max(0) as u32;
        let x2 = (x as i32 + half_window).min(width as i32 - 1) as u32;
        let y2 = (y as i32 + half_window).min(height as i32 - 1) as u32;

        let threshold = window_mean(&integral, x1, y1, x2, y2) - bias;

        let pixel = img.get_pixel(x, y).0[0] as f32;
        binarize(pixel, threshold)
    })
}

fn binarize(pixel: f32, threshold: f32) -> Luma<u8> {
    if pixel > threshold {
        Luma([255u8])
    } else {
        Luma([0u8])
    }
}

/// Compute integral image
fn compute_integral_image(img: &GrayImage) -> Vec<Vec<f64>> {
    let (width, height) = img.dimensions();
    let mut integral = vec![vec![0.0f64; width as usize + 1]; height as usize + 1];

    for y in 0..height as usize {
        for x in 0..width as usize {
            let val = img.get_pixel(x as u32, y as u32).0[0] as f64;
            integral[y + 1][x + 1] =
                val + integral[y][x + 1] + integral[y + 1][x] - integral[y][x];
        }
    }

    integral
}

/// Mean of an inclusive window using the integral image
fn window_mean(integral: &[Vec<f64>], x1: u32, y1: u32, x2: u32, y2: u32) -> f32 {
    let (x1, y1, x2, y2) = (x1 as usize, y1 as usize, x2 as usize + 1, y2 as usize + 1);
    let area = ((x2 - x1) * (y2 - y1)) as f64;

    let sum = integral[y2][x2] - integral[y1][x2] - integral[y2][x1] + integral[y1][x1];

    (sum / area) as f32
}
