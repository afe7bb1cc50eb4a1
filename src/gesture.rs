// Landmark classifier: three hand poses from plain y-coordinate comparisons.
// Everything here is a pure function of one `HandSkeleton`; nothing looks at
// previous frames. The thumb is never examined.

use crate::landmarks::{
    HandSkeleton, INDEX_FINGER_MCP, INDEX_FINGER_TIP, MIDDLE_FINGER_MCP, MIDDLE_FINGER_TIP,
    PINKY_MCP, PINKY_TIP, RING_FINGER_MCP, RING_FINGER_TIP, TRACKED_FINGERS,
};

/// How far (fraction of frame height) the index tip must rise above its knuckle.
pub const INDEX_EXTENDED_MARGIN: f32 = 0.05;
/// How far the middle/ring/pinky tips must drop below their knuckles.
pub const FINGER_CURLED_MARGIN: f32 = 0.02;
/// Fingers (out of the four tracked) that must agree for palm / fist.
pub const FINGERS_REQUIRED: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Gesture {
    #[default]
    None,
    /// Index finger up, the other three curled: draw.
    Point,
    /// All four fingers extended: erase.
    OpenPalm,
    /// All four fingers curled: rest.
    Fist,
}

impl Gesture {
    /// Label used on the viewer channel. The networked front end only knows
    /// draw and erase; a fist is reported the same as no gesture.
    pub fn wire_label(self) -> &'static str {
        match self {
            Gesture::Point => "draw",
            Gesture::OpenPalm => "erase",
            Gesture::Fist | Gesture::None => "none",
        }
    }

    /// Mode banner for the local window.
    pub fn hud_text(self) -> Option<&'static str> {
        match self {
            Gesture::Point => Some("DRAW MODE"),
            Gesture::OpenPalm => Some("ERASING MODE"),
            Gesture::Fist => Some("REST MODE"),
            Gesture::None => None,
        }
    }
}

/// Index extended by a margin while middle, ring and pinky are curled by a margin.
pub fn is_pointing(hand: &HandSkeleton) -> bool {
    let index_tip = hand.get(INDEX_FINGER_TIP);
    let index_mcp = hand.get(INDEX_FINGER_MCP);

    let others_curled = [
        (MIDDLE_FINGER_TIP, MIDDLE_FINGER_MCP),
        (RING_FINGER_TIP, RING_FINGER_MCP),
        (PINKY_TIP, PINKY_MCP),
    ]
    .iter()
    .all(|&(tip, mcp)| hand.get(tip).y > hand.get(mcp).y + FINGER_CURLED_MARGIN);

    index_tip.y < index_mcp.y - INDEX_EXTENDED_MARGIN && others_curled
}

/// Tip strictly above its knuckle, for every tracked finger.
pub fn is_palm_open(hand: &HandSkeleton) -> bool {
    let extended = TRACKED_FINGERS
        .iter()
        .filter(|&&(tip, mcp)| hand.get(tip).y < hand.get(mcp).y)
        .count();
    extended >= FINGERS_REQUIRED
}

/// Tip strictly below its knuckle, for every tracked finger.
pub fn is_fist(hand: &HandSkeleton) -> bool {
    let curled = TRACKED_FINGERS
        .iter()
        .filter(|&&(tip, mcp)| hand.get(tip).y > hand.get(mcp).y)
        .count();
    curled >= FINGERS_REQUIRED
}

/// Open palm wins over fist, fist over pointing. A pointing hand can never
/// also be a fist, so that last order only matters for readability.
pub fn classify(hand: &HandSkeleton) -> Gesture {
    if is_palm_open(hand) {
        Gesture::OpenPalm
    } else if is_fist(hand) {
        Gesture::Fist
    } else if is_pointing(hand) {
        Gesture::Point
    } else {
        Gesture::None
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::landmarks::{INDEX_FINGER_TIP, THUMB_TIP};

    #[test]
    fn pointing_hand_is_point() {
        let hand = pointing_hand();
        assert!(is_pointing(&hand));
        assert_eq!(classify(&hand), Gesture::Point);
    }

    #[test]
    fn pointing_holds_across_a_sweep_of_valid_positions() {
        // index tip anywhere above base - 0.05, others anywhere below base + 0.02
        for i in 0..10 {
            let index_tip = 0.449 - 0.04 * i as f32;
            for j in 0..10 {
                let other = 0.521 + 0.04 * j as f32;
                let hand = hand_with_tips([index_tip, other, other + 0.01, other + 0.02]);
                assert_eq!(classify(&hand), Gesture::Point, "tip={index_tip} other={other}");
            }
        }
    }

    #[test]
    fn pointing_does_not_need_index_above_other_tips() {
        // middle tip sits higher on screen than the index tip, but is still curled
        let mut hand = hand_with_tips([0.3, 0.6, 0.6, 0.6]);
        hand.landmarks[crate::landmarks::MIDDLE_FINGER_MCP].y = 0.1;
        hand.landmarks[crate::landmarks::MIDDLE_FINGER_TIP].y = 0.2;
        assert_eq!(classify(&hand), Gesture::Point);
    }

    #[test]
    fn index_margin_is_strict() {
        // exactly base - 0.05 is not "more than" the margin
        let mut hand = pointing_hand();
        hand.landmarks[INDEX_FINGER_TIP].y = 0.5 - INDEX_EXTENDED_MARGIN;
        assert!(!is_pointing(&hand));
    }

    #[test]
    fn curl_margin_is_strict() {
        let hand = hand_with_tips([0.3, 0.5 + FINGER_CURLED_MARGIN, 0.6, 0.6]);
        assert!(!is_pointing(&hand));
        assert_eq!(classify(&hand), Gesture::None);
    }

    #[test]
    fn open_palm_is_open_palm() {
        assert_eq!(classify(&open_hand()), Gesture::OpenPalm);
    }

    #[test]
    fn open_palm_needs_no_margin() {
        let hand = hand_with_tips([0.499, 0.499, 0.499, 0.499]);
        assert!(is_palm_open(&hand));
    }

    #[test]
    fn three_extended_fingers_are_not_a_palm() {
        let hand = hand_with_tips([0.3, 0.3, 0.3, 0.6]);
        assert!(!is_palm_open(&hand));
        assert_eq!(classify(&hand), Gesture::None);
    }

    #[test]
    fn fist_is_fist() {
        let hand = fist_hand();
        assert!(is_fist(&hand));
        assert!(!is_pointing(&hand));
        assert_eq!(classify(&hand), Gesture::Fist);
    }

    #[test]
    fn fist_needs_no_margin() {
        // the index tip is only just below its knuckle
        let hand = hand_with_tips([0.51, 0.7, 0.7, 0.7]);
        assert_eq!(classify(&hand), Gesture::Fist);
    }

    #[test]
    fn equal_heights_fall_through_to_none() {
        let hand = hand_with_tips([0.5, 0.5, 0.5, 0.5]);
        assert!(!is_palm_open(&hand));
        assert!(!is_fist(&hand));
        assert!(!is_pointing(&hand));
        assert_eq!(classify(&hand), Gesture::None);
    }

    #[test]
    fn thumb_is_ignored() {
        let mut a = pointing_hand();
        let b = pointing_hand();
        a.landmarks[THUMB_TIP].y = 0.0;
        assert_eq!(classify(&a), classify(&b));
        a.landmarks[THUMB_TIP].y = 1.0;
        assert_eq!(classify(&a), classify(&b));
    }

    #[test]
    fn wire_labels() {
        assert_eq!(Gesture::Point.wire_label(), "draw");
        assert_eq!(Gesture::OpenPalm.wire_label(), "erase");
        assert_eq!(Gesture::Fist.wire_label(), "none");
        assert_eq!(Gesture::None.wire_label(), "none");
    }

    #[test]
    fn hud_text_only_for_recognised_poses() {
        assert_eq!(Gesture::Fist.hud_text(), Some("REST MODE"));
        assert_eq!(Gesture::None.hud_text(), None);
    }
}
