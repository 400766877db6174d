// Diatonic scale membership.
//
// Each mode is a fixed 7-note interval pattern above the tonic. Membership
// is answered per pitch class, so any octave (and any negative tone) of a
// scale note is in the scale.
//
// Used by transpose.rs to decide whether a shifted note needs correcting.

use crate::key::{Key, Mode, pitch_class};

impl Mode {
    /// Semitone intervals from the tonic to each of the 7 scale degrees.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Membership table relative to the tonic (index 0 = tonic).
    pub fn pitch_classes(self) -> [bool; 12] {
        let mut pcs = [false; 12];
        for &interval in &self.intervals() {
            pcs[interval as usize] = true;
        }
        pcs
    }
}

impl Key {
    /// Absolute pitch classes of the scale, starting at the tonic.
    pub fn scale(self) -> [u8; 7] {
        self.mode.intervals().map(|iv| (self.tonic % 12 + iv) % 12)
    }

    /// Check whether a tone (any octave) belongs to this key's scale.
    pub fn contains(self, tone: i64) -> bool {
        let degree = (i64::from(pitch_class(tone)) - i64::from(self.tonic)).rem_euclid(12);
        self.mode.pitch_classes()[degree as usize]
    }
}

/// Free-function form of [`Key::contains`].
pub fn in_scale(pitch: i64, tonic: u8, mode: Mode) -> bool {
    Key::new(tonic, mode).contains(pitch)
}
