use super::figure::Rgb;
use crate::constants::COLORMAP_SPAN;
use crate::math_utils::{lerp, linspace};

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Reversed "winter" colormap: green at 0 fading to blue at 1.
pub fn winter_r(x: f64) -> Rgb {
    let w = 1.0 - x.clamp(0.0, 1.0);
    Rgb(0, channel(w), channel(lerp(1.0, 0.5, w)))
}

/// One colour per plotted timestep, spread over `[0, COLORMAP_SPAN]`.
pub fn time_colors(n: usize) -> Vec<Rgb> {
    linspace(0.0, COLORMAP_SPAN, n)
        .into_iter()
        .map(winter_r)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(winter_r(0.0), Rgb(0, 255, 128));
        assert_eq!(winter_r(1.0), Rgb(0, 0, 255));
        assert_eq!(winter_r(-3.0), winter_r(0.0));
    }

    #[test]
    fn time_colors_move_towards_blue() {
        let colors = time_colors(4);
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], winter_r(0.0));
        assert!(colors.windows(2).all(|w| w[0].1 > w[1].1));
        assert!(time_colors(1) == vec![winter_r(0.0)]);
    }
}
