//! Volume synthesis: split a shipment's gross weight across its declared volumes.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::config::VolumeConfig;
use crate::models::volume::SyntheticVolume;

/// Produce one volume per declared unit, each carrying `total / count`
/// rounded to 2 decimals. A count of 0 is treated as 1.
///
/// A count above `dims.max_volumes` yields no volumes and a warning.
pub fn synthesize_volumes(
    total_weight: Decimal,
    count: u32,
    dims: &VolumeConfig,
) -> Vec<SyntheticVolume> {
    let count = count.max(1);
    if count > dims.max_volumes {
        warn!(
            "Declared volume count {} exceeds the limit of {}, no volumes synthesized",
            count, dims.max_volumes
        );
        return Vec::new();
    }

    let mut weight_kg = (total_weight / Decimal::from(count)).round_dp(2);
    weight_kg.rescale(2);
    let volume_m3 = dims.volume_m3();

    debug!(
        "Synthesizing {} volumes of {} kg from {} kg total",
        count, weight_kg, total_weight
    );

    (1..=count)
        .map(|index| SyntheticVolume {
            index,
            weight_kg,
            height_cm: dims.height_cm,
            width_cm: dims.width_cm,
            length_cm: dims.length_cm,
            volume_m3,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_even_split() {
        let volumes = synthesize_volumes(dec("110.0"), 10, &VolumeConfig::default());

        assert_eq!(volumes.len(), 10);
        for (i, volume) in volumes.iter().enumerate() {
            assert_eq!(volume.index, i as u32 + 1);
            assert_eq!(volume.weight_kg.to_string(), "11.00");
            assert_eq!(volume.height_cm, Decimal::from(30));
            assert_eq!(volume.width_cm, Decimal::from(40));
            assert_eq!(volume.length_cm, Decimal::from(50));
            assert_eq!(volume.volume_m3, dec("0.06"));
        }
    }

    #[test]
    fn test_zero_count_is_single_volume() {
        let volumes = synthesize_volumes(dec("110.0"), 0, &VolumeConfig::default());
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].index, 1);
        assert_eq!(volumes[0].weight_kg, dec("110.00"));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        let volumes = synthesize_volumes(dec("100"), 3, &VolumeConfig::default());
        assert_eq!(volumes.len(), 3);
        assert_eq!(volumes[0].weight_kg.to_string(), "33.33");
    }

    #[test]
    fn test_custom_dimensions() {
        let dims = VolumeConfig {
            height_cm: Decimal::from(10),
            width_cm: Decimal::from(20),
            length_cm: Decimal::from(30),
            ..VolumeConfig::default()
        };
        let volumes = synthesize_volumes(Decimal::ZERO, 2, &dims);
        assert_eq!(volumes[1].weight_kg, Decimal::ZERO);
        assert_eq!(volumes[1].volume_m3, dec("0.006"));
    }

    #[test]
    fn test_count_above_limit_is_rejected() {
        let volumes = synthesize_volumes(dec("1000"), 4_000_000_000, &VolumeConfig::default());
        assert!(volumes.is_empty());

        let dims = VolumeConfig {
            max_volumes: 5,
            ..VolumeConfig::default()
        };
        assert_eq!(synthesize_volumes(dec("10"), 5, &dims).len(), 5);
        assert!(synthesize_volumes(dec("10"), 6, &dims).is_empty());
    }
}
