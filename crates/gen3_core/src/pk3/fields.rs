//! Bit-packed field views. Each type wraps the stored integer and exposes
//! shift/mask accessors; setters reject values wider than their field.

use serde::{Deserialize, Serialize};

use crate::core_api::CoreError;

const fn mask(width: u32) -> u32 {
    (1u32 << width) - 1
}

fn get_bits(word: u32, shift: u32, width: u32) -> u32 {
    (word >> shift) & mask(width)
}

fn set_bits(word: u32, shift: u32, width: u32, value: u32) -> u32 {
    (word & !(mask(width) << shift)) | ((value & mask(width)) << shift)
}

fn check_width(field: &str, value: u32, width: u32) -> Result<(), CoreError> {
    if value > mask(width) {
        return Err(CoreError::invalid_value(format!(
            "{field} value {value} exceeds {}",
            mask(width)
        )));
    }
    Ok(())
}

fn set_flag(word: u32, bit: u32, on: bool) -> u32 {
    set_bits(word, bit, 1, on as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp = 0,
    Attack = 1,
    Defense = 2,
    Speed = 3,
    SpAttack = 4,
    SpDefense = 5,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::Speed,
        Stat::SpAttack,
        Stat::SpDefense,
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Hp => "hp",
            Self::Attack => "atk",
            Self::Defense => "def",
            Self::Speed => "spd",
            Self::SpAttack => "satk",
            Self::SpDefense => "sdef",
        }
    }
}

/// Marking byte. Bits 4-7 are unused and carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkingFlags(pub u8);

impl MarkingFlags {
    const CIRCLE: u32 = 0;
    const SQUARE: u32 = 1;
    const TRIANGLE: u32 = 2;
    const HEART: u32 = 3;

    fn bit(&self, bit: u32) -> bool {
        get_bits(self.0 as u32, bit, 1) != 0
    }

    fn with(self, bit: u32, on: bool) -> Self {
        Self(set_flag(self.0 as u32, bit, on) as u8)
    }

    pub fn circle(&self) -> bool {
        self.bit(Self::CIRCLE)
    }

    pub fn square(&self) -> bool {
        self.bit(Self::SQUARE)
    }

    pub fn triangle(&self) -> bool {
        self.bit(Self::TRIANGLE)
    }

    pub fn heart(&self) -> bool {
        self.bit(Self::HEART)
    }

    pub fn with_circle(self, on: bool) -> Self {
        self.with(Self::CIRCLE, on)
    }

    pub fn with_square(self, on: bool) -> Self {
        self.with(Self::SQUARE, on)
    }

    pub fn with_triangle(self, on: bool) -> Self {
        self.with(Self::TRIANGLE, on)
    }

    pub fn with_heart(self, on: bool) -> Self {
        self.with(Self::HEART, on)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ribbon {
    CoolNormal,
    CoolSuper,
    CoolHyper,
    CoolMaster,
    BeautyNormal,
    BeautySuper,
    BeautyHyper,
    BeautyMaster,
    CuteNormal,
    CuteSuper,
    CuteHyper,
    CuteMaster,
    SmartNormal,
    SmartSuper,
    SmartHyper,
    SmartMaster,
    ToughNormal,
    ToughSuper,
    ToughHyper,
    ToughMaster,
    Champion,
    Winning,
    Victory,
    Artist,
    Effort,
    Marine,
    Land,
    Sky,
    Country,
    National,
    Earth,
    World,
}

impl Ribbon {
    /// In bit order: `ALL[n]` lives at bit `n`.
    pub const ALL: [Ribbon; 32] = [
        Ribbon::CoolNormal,
        Ribbon::CoolSuper,
        Ribbon::CoolHyper,
        Ribbon::CoolMaster,
        Ribbon::BeautyNormal,
        Ribbon::BeautySuper,
        Ribbon::BeautyHyper,
        Ribbon::BeautyMaster,
        Ribbon::CuteNormal,
        Ribbon::CuteSuper,
        Ribbon::CuteHyper,
        Ribbon::CuteMaster,
        Ribbon::SmartNormal,
        Ribbon::SmartSuper,
        Ribbon::SmartHyper,
        Ribbon::SmartMaster,
        Ribbon::ToughNormal,
        Ribbon::ToughSuper,
        Ribbon::ToughHyper,
        Ribbon::ToughMaster,
        Ribbon::Champion,
        Ribbon::Winning,
        Ribbon::Victory,
        Ribbon::Artist,
        Ribbon::Effort,
        Ribbon::Marine,
        Ribbon::Land,
        Ribbon::Sky,
        Ribbon::Country,
        Ribbon::National,
        Ribbon::Earth,
        Ribbon::World,
    ];

    pub fn bit(&self) -> u32 {
        *self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RibbonFlags(pub u32);

impl RibbonFlags {
    pub fn has(&self, ribbon: Ribbon) -> bool {
        get_bits(self.0, ribbon.bit(), 1) != 0
    }

    pub fn with(self, ribbon: Ribbon, on: bool) -> Self {
        Self(set_flag(self.0, ribbon.bit(), on))
    }

    pub fn earned(&self) -> Vec<Ribbon> {
        Ribbon::ALL
            .iter()
            .copied()
            .filter(|ribbon| self.has(*ribbon))
            .collect()
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

fn check_move_index(move_index: usize) -> Result<(), CoreError> {
    if move_index >= 4 {
        return Err(CoreError::out_of_range(format!(
            "move index {move_index} out of range 0..4"
        )));
    }
    Ok(())
}

/// Four 2-bit PP-up counters, move 0 in the low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PpUps(pub u8);

impl PpUps {
    pub fn get(&self, move_index: usize) -> Result<u8, CoreError> {
        check_move_index(move_index)?;
        Ok(get_bits(self.0 as u32, move_index as u32 * 2, 2) as u8)
    }

    pub fn with(self, move_index: usize, count: u8) -> Result<Self, CoreError> {
        check_move_index(move_index)?;
        check_width("pp up", count as u32, 2)?;
        Ok(Self(
            set_bits(self.0 as u32, move_index as u32 * 2, 2, count as u32) as u8,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pokerus(pub u8);

impl Pokerus {
    pub fn new(days: u8, strain: u8) -> Result<Self, CoreError> {
        check_width("pokerus days", days as u32, 4)?;
        check_width("pokerus strain", strain as u32, 4)?;
        Ok(Self(days | (strain << 4)))
    }

    pub fn days(&self) -> u8 {
        self.0 & 0x0F
    }

    pub fn strain(&self) -> u8 {
        self.0 >> 4
    }

    pub fn is_infected(&self) -> bool {
        self.strain() != 0
    }
}

/// Origins word: level met bits 0-6, OT-female bit 7, game bits 8-11,
/// ball bits 12-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Origins(pub u16);

impl Origins {
    pub fn new(level_met: u8, ot_female: bool, game: u8, ball: u8) -> Result<Self, CoreError> {
        check_width("level met", level_met as u32, 7)?;
        check_width("origin game", game as u32, 4)?;
        check_width("ball", ball as u32, 4)?;
        let mut word = set_bits(0, 0, 7, level_met as u32);
        word = set_flag(word, 7, ot_female);
        word = set_bits(word, 8, 4, game as u32);
        word = set_bits(word, 12, 4, ball as u32);
        Ok(Self(word as u16))
    }

    pub fn level_met(&self) -> u8 {
        get_bits(self.0 as u32, 0, 7) as u8
    }

    pub fn ot_female(&self) -> bool {
        get_bits(self.0 as u32, 7, 1) != 0
    }

    pub fn game(&self) -> u8 {
        get_bits(self.0 as u32, 8, 4) as u8
    }

    pub fn ball(&self) -> u8 {
        get_bits(self.0 as u32, 12, 4) as u8
    }
}

/// The IV word: five-bit values for each stat, then the egg flag (bit 30)
/// and the ability flag (bit 31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IvWord(pub u32);

impl IvWord {
    pub const MAX_IV: u8 = 31;
    const EGG_BIT: u32 = 30;
    const ABILITY_BIT: u32 = 31;

    pub fn get(&self, stat: Stat) -> u8 {
        get_bits(self.0, stat as u32 * 5, 5) as u8
    }

    pub fn with(self, stat: Stat, value: u8) -> Result<Self, CoreError> {
        check_width(stat.as_str(), value as u32, 5)?;
        Ok(Self(set_bits(self.0, stat as u32 * 5, 5, value as u32)))
    }

    pub fn values(&self) -> IndividualValues {
        IndividualValues {
            hp: self.get(Stat::Hp),
            atk: self.get(Stat::Attack),
            def: self.get(Stat::Defense),
            spd: self.get(Stat::Speed),
            satk: self.get(Stat::SpAttack),
            sdef: self.get(Stat::SpDefense),
        }
    }

    pub fn is_egg(&self) -> bool {
        get_bits(self.0, Self::EGG_BIT, 1) != 0
    }

    pub fn with_egg(self, on: bool) -> Self {
        Self(set_flag(self.0, Self::EGG_BIT, on))
    }

    pub fn ability_flag(&self) -> bool {
        get_bits(self.0, Self::ABILITY_BIT, 1) != 0
    }

    pub fn with_ability_flag(self, on: bool) -> Self {
        Self(set_flag(self.0, Self::ABILITY_BIT, on))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndividualValues {
    pub hp: u8,
    pub atk: u8,
    pub def: u8,
    pub spd: u8,
    pub satk: u8,
    pub sdef: u8,
}

impl IndividualValues {
    pub fn to_word(&self, base: IvWord) -> Result<IvWord, CoreError> {
        base.with(Stat::Hp, self.hp)?
            .with(Stat::Attack, self.atk)?
            .with(Stat::Defense, self.def)?
            .with(Stat::Speed, self.spd)?
            .with(Stat::SpAttack, self.satk)?
            .with(Stat::SpDefense, self.sdef)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EffortValues {
    pub hp: u8,
    pub atk: u8,
    pub def: u8,
    pub spd: u8,
    pub satk: u8,
    pub sdef: u8,
}

impl EffortValues {
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        let [hp, atk, def, spd, satk, sdef] = bytes;
        Self {
            hp,
            atk,
            def,
            spd,
            satk,
            sdef,
        }
    }

    pub fn to_bytes(&self) -> [u8; 6] {
        [self.hp, self.atk, self.def, self.spd, self.satk, self.sdef]
    }

    pub fn get(&self, stat: Stat) -> u8 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.atk,
            Stat::Defense => self.def,
            Stat::Speed => self.spd,
            Stat::SpAttack => self.satk,
            Stat::SpDefense => self.sdef,
        }
    }

    pub fn total(&self) -> u32 {
        self.to_bytes().iter().map(|&v| v as u32).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContestStats {
    pub cool: u8,
    pub beauty: u8,
    pub cute: u8,
    pub smart: u8,
    pub tough: u8,
    pub sheen: u8,
}

impl ContestStats {
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        let [cool, beauty, cute, smart, tough, sheen] = bytes;
        Self {
            cool,
            beauty,
            cute,
            smart,
            tough,
            sheen,
        }
    }

    pub fn to_bytes(&self) -> [u8; 6] {
        [
            self.cool,
            self.beauty,
            self.cute,
            self.smart,
            self.tough,
            self.sheen,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{IvWord, Origins, PpUps, Ribbon, RibbonFlags, Stat};

    #[test]
    fn iv_fields_do_not_bleed_into_flags() {
        let mut word = IvWord::default().with_egg(true);
        for stat in Stat::ALL {
            word = word.with(stat, 31).expect("31 is in range");
        }
        assert_eq!(word.0, 0x7FFF_FFFF);
        assert!(word.is_egg());
        assert!(!word.ability_flag());
        assert!(word.with(Stat::Speed, 32).is_err());
    }

    #[test]
    fn origins_pack_in_declared_bit_order() {
        let origins = Origins::new(5, true, 3, 4).expect("valid origins");
        assert_eq!(origins.0, 0x4385);
        assert_eq!(origins.level_met(), 5);
        assert!(origins.ot_female());
        assert_eq!(origins.game(), 3);
        assert_eq!(origins.ball(), 4);
        assert!(Origins::new(128, false, 0, 0).is_err());
    }

    #[test]
    fn ribbon_bits_follow_declaration_order() {
        let flags = RibbonFlags::default()
            .with(Ribbon::CoolNormal, true)
            .with(Ribbon::World, true);
        assert_eq!(flags.0, 0x8000_0001);
        assert_eq!(flags.earned(), vec![Ribbon::CoolNormal, Ribbon::World]);
        for (bit, ribbon) in Ribbon::ALL.iter().enumerate() {
            assert_eq!(ribbon.bit(), bit as u32);
        }
    }

    #[test]
    fn pp_ups_are_two_bits_per_move() {
        let pp = PpUps::default().with(3, 3).expect("valid");
        assert_eq!(pp.0, 0b1100_0000);
        assert_eq!(pp.get(3).expect("move 3"), 3);
        assert_eq!(pp.get(0).expect("move 0"), 0);
        assert!(pp.get(5).is_err());
        assert!(pp.with(0, 4).is_err());
        assert!(pp.with(4, 1).is_err());
    }
}
