use ordered_float::OrderedFloat;

use crate::spot::Spot;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance in km between two `[lat, lng]` pairs.
pub fn distance_km(from: [f64; 2], to: [f64; 2]) -> f64 {
    let d_lat = (to[0] - from[0]).to_radians();
    let d_lng = (to[1] - from[1]).to_radians();
    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + from[0].to_radians().cos()
            * to[0].to_radians().cos()
            * (d_lng / 2.0).sin()
            * (d_lng / 2.0).sin();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Spots annotated with their distance from the viewer and sorted nearest
/// first. Without a viewer position (geolocation denied or unavailable) the
/// list is returned in its default order with no distances, which the shell
/// pairs with an advisory banner.
pub fn nearby(spots: &[Spot], viewer: Option<[f64; 2]>) -> Vec<Spot> {
    let Some(viewer) = viewer else {
        return spots.to_vec();
    };

    let mut nearby: Vec<Spot> = spots
        .iter()
        .map(|spot| {
            let mut spot = spot.clone();
            spot.distance = Some(distance_km(viewer, spot.position));
            spot
        })
        .collect();
    nearby.sort_by_key(|spot| OrderedFloat(spot.distance.unwrap_or(f64::MAX)));
    nearby
}

/// "850m" under a km, "12.3 km" above.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1} km")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::{Difficulty, StartType};

    fn spot_at(id: &str, position: [f64; 2]) -> Spot {
        Spot {
            id: id.to_string(),
            name: id.to_string(),
            start_types: vec![StartType::Dockstart],
            position,
            description: String::new(),
            description_fr: None,
            difficulty: Difficulty::Easy,
            height: None,
            image_urls: None,
            is_approved: true,
            distance: None,
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111km() {
        let d = distance_km([0.0, 0.0], [1.0, 0.0]);
        assert!((d - 111.195).abs() < 0.1, "got {d}");
    }

    #[test]
    fn zero_distance_for_identical_points() {
        assert_eq!(distance_km([46.5, 6.6], [46.5, 6.6]), 0.0);
    }

    #[test]
    fn nearby_sorts_nearest_first() {
        let spots = vec![
            spot_at("far", [10.0, 0.0]),
            spot_at("near", [1.0, 0.0]),
            spot_at("mid", [5.0, 0.0]),
        ];

        let sorted = nearby(&spots, Some([0.0, 0.0]));
        let ids: Vec<_> = sorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["near", "mid", "far"]);
        assert!(sorted.iter().all(|s| s.distance.is_some()));
    }

    #[test]
    fn missing_viewer_position_keeps_default_order() {
        let spots = vec![spot_at("b", [10.0, 0.0]), spot_at("a", [1.0, 0.0])];

        let unsorted = nearby(&spots, None);
        let ids: Vec<_> = unsorted.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(unsorted.iter().all(|s| s.distance.is_none()));
    }

    #[test]
    fn distances_format_like_the_map_labels() {
        assert_eq!(format_distance(0.4), "400m");
        assert_eq!(format_distance(0.9996), "1000m");
        assert_eq!(format_distance(1.0), "1.0 km");
        assert_eq!(format_distance(12.34), "12.3 km");
    }
}
