/// Zero-mean normalized cross-correlation score maps
///
/// Scores follow the correlation coefficient: template and window are both
/// mean-subtracted before normalizing, so flat or smoothly shaded areas score
/// near zero instead of near one. The raw `sum(I * T)` comes from
/// `imageproc::template_matching`, window sums from integral images.
use image::{GrayImage, ImageBuffer, Luma, RgbImage, RgbaImage, imageops};
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, match_template};

use super::template::Template;
use super::types::ColorMode;

/// One score per top-left template position, `(W-w+1) x (H-h+1)`.
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

type Integral = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Correlation of `template` against every position in `frame`.
///
/// `None` when the template does not fit in the frame. Positions where the
/// window or the template has no variance score NaN.
pub fn score_map(frame: &RgbaImage, template: &Template, mode: ColorMode) -> Option<ScoreMap> {
    if template.width() > frame.width() || template.height() > frame.height() {
        log::debug!(
            "Template '{}' ({}x{}) larger than frame ({}x{}), skipping",
            template.name(),
            template.width(),
            template.height(),
            frame.width(),
            frame.height()
        );
        return None;
    }

    let terms = match mode {
        ColorMode::Grayscale => {
            let gray = imageops::grayscale(frame);
            ChannelTerms::compute(&gray, template.gray())
        }
        // Channels are summed before normalizing, like a joint 3-channel
        // coefficient, so one flat channel does not blank the whole map
        ColorMode::Color => (0..3)
            .map(|c| ChannelTerms::compute(&rgba_channel(frame, c), &rgb_channel(template.color(), c)))
            .reduce(ChannelTerms::merge)?,
    };

    Some(terms.scores())
}

/// Unnormalized zero-mean terms at every position, all scaled by the pixel
/// count `n` so they stay exact integers where possible:
/// `n*sum(IT) - sum(I)*sum(T)`, `n*sum(I^2) - sum(I)^2`, `n*sum(T^2) - sum(T)^2`.
struct ChannelTerms {
    width: u32,
    height: u32,
    covariance: Vec<f64>,
    window_spread: Vec<f64>,
    template_spread: f64,
}

impl ChannelTerms {
    fn compute(image: &GrayImage, template: &GrayImage) -> Self {
        let products = match_template(image, template, MatchTemplateMethod::CrossCorrelation);
        let sums: Integral = integral_image::<_, u64>(image);
        let squares: Integral = integral_squared_image::<_, u64>(image);

        let (tw, th) = template.dimensions();
        let n = u64::from(tw) * u64::from(th);
        let (t_sum, t_squares) = template.pixels().fold((0u64, 0u64), |(sum, sq), p| {
            let v = u64::from(p[0]);
            (sum + v, sq + v * v)
        });

        let (width, height) = products.dimensions();
        let mut covariance = Vec::with_capacity((width * height) as usize);
        let mut window_spread = Vec::with_capacity((width * height) as usize);
        for (x, y, product) in products.enumerate_pixels() {
            let w_sum = window_sum(&sums, x, y, tw, th);
            let w_squares = window_sum(&squares, x, y, tw, th);
            covariance.push(n as f64 * f64::from(product[0]) - w_sum as f64 * t_sum as f64);
            window_spread.push(spread(n, w_sum, w_squares));
        }

        Self {
            width,
            height,
            covariance,
            window_spread,
            template_spread: spread(n, t_sum, t_squares),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (acc, v) in self.covariance.iter_mut().zip(&other.covariance) {
            *acc += v;
        }
        for (acc, v) in self.window_spread.iter_mut().zip(&other.window_spread) {
            *acc += v;
        }
        self.template_spread += other.template_spread;
        self
    }

    fn scores(&self) -> ScoreMap {
        ScoreMap::from_fn(self.width, self.height, |x, y| {
            let i = (y * self.width + x) as usize;
            let denominator = (self.window_spread[i] * self.template_spread).sqrt();
            if denominator == 0.0 {
                return Luma([f32::NAN]);
            }
            Luma([(self.covariance[i] / denominator).clamp(-1.0, 1.0) as f32])
        })
    }
}

/// Sum over the `w x h` window at `(x, y)` from a padded integral image.
fn window_sum(integral: &Integral, x: u32, y: u32, w: u32, h: u32) -> u64 {
    let at = |x: u32, y: u32| integral.get_pixel(x, y)[0];
    (at(x + w, y + h) + at(x, y)) - (at(x, y + h) + at(x + w, y))
}

/// `n*sum(v^2) - sum(v)^2`; zero exactly when every value is equal.
fn spread(n: u64, sum: u64, squares: u64) -> f64 {
    (u128::from(n) * u128::from(squares) - u128::from(sum) * u128::from(sum)) as f64
}

fn rgba_channel(image: &RgbaImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[channel]])
    })
}

fn rgb_channel(image: &RgbImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y)[channel]])
    })
}

/// Position and value of the highest finite score.
///
/// Ties resolve to the first position in row-major order.
pub fn peak(scores: &ScoreMap) -> Option<(u32, u32, f32)> {
    let mut best: Option<(u32, u32, f32)> = None;
    for (x, y, pixel) in scores.enumerate_pixels() {
        let score = pixel[0];
        if !score.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, _, current)| score > current) {
            best = Some((x, y, score));
        }
    }
    best
}

/// Every position whose finite score is at least `threshold`, row-major.
pub fn positions_at_or_above(scores: &ScoreMap, threshold: f32) -> Vec<(u32, u32, f32)> {
    scores
        .enumerate_pixels()
        .filter_map(|(x, y, pixel)| {
            let score = pixel[0];
            (score.is_finite() && score >= threshold).then_some((x, y, score))
        })
        .collect()
}
