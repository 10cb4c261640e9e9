/// Raw sample sequence id. Increments once per raw sample and wraps at 65536.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct SeqId(pub u16);

impl SeqId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u16 {
        self.0
    }

    /// Forward distance from `earlier` to `self`, modulo 65536.
    pub const fn cyclic_distance(self, earlier: SeqId) -> u16 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Shortest distance between two ids in either direction.
    pub fn separation(self, other: SeqId) -> u16 {
        let forward = self.cyclic_distance(other);
        let backward = other.cyclic_distance(self);
        forward.min(backward)
    }

    pub const fn advance(self, samples: u16) -> Self {
        Self(self.0.wrapping_add(samples))
    }

    pub const fn rewind(self, samples: u16) -> Self {
        Self(self.0.wrapping_sub(samples))
    }
}

impl From<u16> for SeqId {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

pub fn samples_to_ms(samples: u16, odr_hz: f32) -> u32 {
    if odr_hz <= 0.0 {
        return 0;
    }
    (samples as f32 * 1000.0 / odr_hz) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_distance_survives_wraparound() {
        let previous = SeqId(65534);
        let current = SeqId(5);
        assert_eq!(current.cyclic_distance(previous), 7);
        assert_eq!(
            SeqId(107).cyclic_distance(SeqId(100)),
            current.cyclic_distance(previous)
        );
    }

    #[test]
    fn separation_is_symmetric() {
        assert_eq!(SeqId(3).separation(SeqId(65533)), 6);
        assert_eq!(SeqId(65533).separation(SeqId(3)), 6);
        assert_eq!(SeqId(40).separation(SeqId(40)), 0);
    }

    #[test]
    fn advance_and_rewind_wrap() {
        assert_eq!(SeqId(65530).advance(10), SeqId(4));
        assert_eq!(SeqId(4).rewind(13), SeqId(65527));
    }

    #[test]
    fn interval_conversion_uses_rate() {
        assert_eq!(samples_to_ms(7, 100.0), 70);
        assert_eq!(samples_to_ms(52, 104.0), 500);
        assert_eq!(samples_to_ms(10, 0.0), 0);
    }
}
