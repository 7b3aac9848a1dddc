//! Data logic behind the admin dashboard: the two views over the unified
//! list and the preview carousel. The approve/delete/update actions
//! themselves go through the synchronizer; nothing here talks to the backend.

use wasm_bindgen::prelude::*;

use crate::spot::Spot;

/// The dashboard tabs. Both are live filters over the synchronizer's list:
/// a spot leaves `Pending` the instant its flag flips or it is deleted.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ModerationView {
    Pending,
    All,
}

pub fn pending_spots(spots: &[Spot]) -> Vec<Spot> {
    spots.iter().filter(|s| !s.is_approved).cloned().collect()
}

pub fn visible_spots(view: ModerationView, spots: &[Spot]) -> Vec<Spot> {
    match view {
        ModerationView::Pending => pending_spots(spots),
        ModerationView::All => spots.to_vec(),
    }
}

/// Index state for the preview photo gallery. Navigation wraps in both
/// directions; thumbnails jump directly.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub struct PhotoCarousel {
    index: usize,
    count: usize,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl PhotoCarousel {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(count: usize) -> PhotoCarousel {
        PhotoCarousel { index: 0, count }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next(&mut self) {
        if self.count > 0 {
            self.index = (self.index + 1) % self.count;
        }
    }

    pub fn previous(&mut self) {
        if self.count > 0 {
            self.index = (self.index + self.count - 1) % self.count;
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.count {
            self.index = index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::{Difficulty, StartType};

    fn spot(id: &str, is_approved: bool) -> Spot {
        Spot {
            id: id.to_string(),
            name: id.to_string(),
            start_types: vec![StartType::Dockstart],
            position: [0.0, 0.0],
            description: String::new(),
            description_fr: None,
            difficulty: Difficulty::Easy,
            height: None,
            image_urls: None,
            is_approved,
            distance: None,
        }
    }

    #[test]
    fn pending_view_tracks_the_approved_flag() {
        let mut spots = vec![spot("a", true), spot("b", false), spot("c", false)];

        let pending: Vec<_> = pending_spots(&spots)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(pending, ["b", "c"]);

        // approving moves the spot out of the pending view instantly
        spots[1].is_approved = true;
        let pending: Vec<_> = pending_spots(&spots)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(pending, ["c"]);

        assert_eq!(visible_spots(ModerationView::All, &spots).len(), 3);
    }

    #[test]
    fn carousel_wraps_both_directions() {
        let mut carousel = PhotoCarousel::new(3);
        assert_eq!(carousel.index(), 0);

        carousel.previous();
        assert_eq!(carousel.index(), 2, "previous at 0 wraps to the last photo");

        carousel.next();
        assert_eq!(carousel.index(), 0, "next at the last photo wraps to 0");

        carousel.next();
        carousel.next();
        assert_eq!(carousel.index(), 2);
    }

    #[test]
    fn empty_carousel_stays_at_zero() {
        let mut carousel = PhotoCarousel::new(0);
        carousel.next();
        carousel.previous();
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn select_ignores_out_of_range_thumbnails() {
        let mut carousel = PhotoCarousel::new(4);
        carousel.select(2);
        assert_eq!(carousel.index(), 2);
        carousel.select(9);
        assert_eq!(carousel.index(), 2);
    }
}
