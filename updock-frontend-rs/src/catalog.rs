//! The bundled seed catalog. These spots ship with the app, are always
//! approved, and never exist in the backend: their ids carry a region prefix
//! (`fr-`, `ch-`, `es-`) that backend-generated ids can never collide with.

use std::sync::LazyLock;

use crate::spot::{Difficulty, Spot, StartType};

/// Id prefixes reserved for catalog entries, one per seeded region.
const STATIC_ID_PREFIXES: [&str; 3] = ["fr-", "ch-", "es-"];

/// Whether `id` names a catalog entry rather than a backend row. Deleting
/// such an id only ever touches local memory.
pub fn is_static_id(id: &str) -> bool {
    STATIC_ID_PREFIXES
        .iter()
        .any(|prefix| id.starts_with(prefix))
}

pub static STATIC_SPOTS: LazyLock<Vec<Spot>> = LazyLock::new(|| {
    let spot = |id: &str,
                name: &str,
                start_types: &[StartType],
                position: [f64; 2],
                description: &str,
                difficulty: Difficulty| Spot {
        id: id.to_string(),
        name: name.to_string(),
        start_types: start_types.to_vec(),
        position,
        description: description.to_string(),
        description_fr: None,
        difficulty,
        height: None,
        image_urls: None,
        is_approved: true,
        distance: None,
    };

    vec![
        // France
        Spot {
            description_fr: Some(
                "Spot populaire en Ile-de-France. Grand lac avec de bonnes conditions pour le \
                 pumping. Souvent fréquenté le week-end."
                    .to_string(),
            ),
            ..spot(
                "fr-moisson",
                "Moisson Lavacourt",
                &[StartType::Dockstart],
                [49.0729, 1.6692],
                "Popular spot in Ile-de-France. Large lake with good conditions for pumping. \
                 Often busy on weekends.",
                Difficulty::Medium,
            )
        },
        spot(
            "fr-jablines",
            "Jablines-Annet",
            &[StartType::Dockstart],
            [48.9108, 2.7306],
            "Base de Loisirs near Paris. Clean water and nice pontoons. Check opening hours and \
             entry fees.",
            Difficulty::Easy,
        ),
        spot(
            "fr-talloires",
            "Talloires - Petit Port",
            &[StartType::Dockstart],
            [45.84, 6.21],
            "Stunning spot on Lake Annecy. Crystal clear water. Launch from the small wooden dock \
             near the harbor.",
            Difficulty::Medium,
        ),
        Spot {
            height: Some(1.5),
            ..spot(
                "fr-crau",
                "Aqueduc St Martin",
                &[StartType::Dropstart],
                [43.6333, 4.8167],
                "Famous dropstart spot in Provence using the canal infrastructure. Requires good \
                 technique. High speed entry!",
                Difficulty::Extreme,
            )
        },
        // Switzerland
        spot(
            "ch-nidau",
            "Plage de Nidau",
            &[StartType::Dockstart],
            [47.128, 7.24],
            "Located on Lake Bienne. Very popular community spot. Low docks ideal for learning.",
            Difficulty::Easy,
        ),
        spot(
            "ch-coppet",
            "Plage de Coppet",
            &[StartType::Dockstart],
            [46.3172, 6.1939],
            "Classic Lake Geneva spot. Nice grassy area to rig and a concrete dock. Good depth \
             immediately.",
            Difficulty::Medium,
        ),
        spot(
            "ch-laax",
            "Laaxer See (Lag Grond)",
            &[StartType::Dockstart],
            [46.8059, 9.2582],
            "High altitude alpine lake (1000m+). Cold water but flat and scenic. Check local \
             regulations.",
            Difficulty::Hard,
        ),
        // Spain
        spot(
            "es-tarifa",
            "Tarifa - Balneario",
            &[StartType::Dockstart, StartType::Rockstart],
            [36.0139, -5.6070],
            "The Mecca of wind. Can be used for dockstart on calm days or \"Rockstart\" from the \
             causeway stones.",
            Difficulty::Hard,
        ),
        spot(
            "es-barcelona",
            "Forum Barcelona",
            &[StartType::Dockstart],
            [41.4099, 2.2271],
            "Artificial bathing area in the city. Protected water, very flat. Great for training \
             sequences.",
            Difficulty::Easy,
        ),
        spot(
            "es-estartit",
            "L'Estartit",
            &[StartType::Dockstart, StartType::Rockstart],
            [42.05, 3.20],
            "Costa Brava vibe. Launch from the harbor walls or nearby rocky outcrops. Watch out \
             for boats.",
            Difficulty::Medium,
        ),
    ]
});
