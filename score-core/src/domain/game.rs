use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::error::DomainError;

/// Games that scores can be imported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Iidx,
    Sdvx,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::Iidx, Game::Sdvx];

    pub fn as_str(&self) -> &'static str {
        match self {
            Game::Iidx => "iidx",
            Game::Sdvx => "sdvx",
        }
    }

    /// Play-modes this game supports
    pub fn playtypes(&self) -> &'static [Playtype] {
        match self {
            Game::Iidx => &[Playtype::Sp, Playtype::Dp],
            Game::Sdvx => &[Playtype::Single],
        }
    }

    pub fn supports(&self, playtype: Playtype) -> bool {
        self.playtypes().contains(&playtype)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Game {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Game::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| DomainError::unknown("game", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Playtype {
    #[serde(rename = "SP")]
    Sp,
    #[serde(rename = "DP")]
    Dp,
    #[serde(rename = "Single")]
    Single,
}

impl Playtype {
    pub const ALL: [Playtype; 3] = [Playtype::Sp, Playtype::Dp, Playtype::Single];

    pub fn as_str(&self) -> &'static str {
        match self {
            Playtype::Sp => "SP",
            Playtype::Dp => "DP",
            Playtype::Single => "Single",
        }
    }
}

impl fmt::Display for Playtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Playtype {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Playtype::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::unknown("playtype", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IidxDifficulty {
    #[serde(rename = "BEGINNER")]
    Beginner,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "HYPER")]
    Hyper,
    #[serde(rename = "ANOTHER")]
    Another,
    #[serde(rename = "LEGGENDARIA")]
    Leggendaria,
}

impl IidxDifficulty {
    pub const ALL: [IidxDifficulty; 5] = [
        IidxDifficulty::Beginner,
        IidxDifficulty::Normal,
        IidxDifficulty::Hyper,
        IidxDifficulty::Another,
        IidxDifficulty::Leggendaria,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IidxDifficulty::Beginner => "BEGINNER",
            IidxDifficulty::Normal => "NORMAL",
            IidxDifficulty::Hyper => "HYPER",
            IidxDifficulty::Another => "ANOTHER",
            IidxDifficulty::Leggendaria => "LEGGENDARIA",
        }
    }
}

/// SDVX difficulties. INF, GRV, HVN, VVD and XCD all occupy the fourth slot
/// depending on the version a chart was introduced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SdvxDifficulty {
    #[serde(rename = "NOV")]
    Nov,
    #[serde(rename = "ADV")]
    Adv,
    #[serde(rename = "EXH")]
    Exh,
    #[serde(rename = "INF")]
    Inf,
    #[serde(rename = "GRV")]
    Grv,
    #[serde(rename = "HVN")]
    Hvn,
    #[serde(rename = "VVD")]
    Vvd,
    #[serde(rename = "XCD")]
    Xcd,
    #[serde(rename = "MXM")]
    Mxm,
}

impl SdvxDifficulty {
    pub const ALL: [SdvxDifficulty; 9] = [
        SdvxDifficulty::Nov,
        SdvxDifficulty::Adv,
        SdvxDifficulty::Exh,
        SdvxDifficulty::Inf,
        SdvxDifficulty::Grv,
        SdvxDifficulty::Hvn,
        SdvxDifficulty::Vvd,
        SdvxDifficulty::Xcd,
        SdvxDifficulty::Mxm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SdvxDifficulty::Nov => "NOV",
            SdvxDifficulty::Adv => "ADV",
            SdvxDifficulty::Exh => "EXH",
            SdvxDifficulty::Inf => "INF",
            SdvxDifficulty::Grv => "GRV",
            SdvxDifficulty::Hvn => "HVN",
            SdvxDifficulty::Vvd => "VVD",
            SdvxDifficulty::Xcd => "XCD",
            SdvxDifficulty::Mxm => "MXM",
        }
    }

    /// Whether this is one of the fourth-slot "infinite" family difficulties
    pub fn is_infinite_family(&self) -> bool {
        matches!(
            self,
            SdvxDifficulty::Inf
                | SdvxDifficulty::Grv
                | SdvxDifficulty::Hvn
                | SdvxDifficulty::Vvd
                | SdvxDifficulty::Xcd
        )
    }
}

/// Canonical difficulty tier of a chart.
///
/// Serialized as the bare difficulty name; the names of the two games do not
/// overlap, so deserialization is unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Difficulty {
    Iidx(IidxDifficulty),
    Sdvx(SdvxDifficulty),
}

impl Difficulty {
    pub fn game(&self) -> Game {
        match self {
            Difficulty::Iidx(_) => Game::Iidx,
            Difficulty::Sdvx(_) => Game::Sdvx,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Iidx(d) => d.as_str(),
            Difficulty::Sdvx(d) => d.as_str(),
        }
    }

    /// Parse a canonical difficulty name for the given game
    pub fn parse(game: Game, s: &str) -> Result<Self, DomainError> {
        let found = match game {
            Game::Iidx => IidxDifficulty::ALL
                .into_iter()
                .find(|d| d.as_str() == s)
                .map(Difficulty::Iidx),
            Game::Sdvx => SdvxDifficulty::ALL
                .into_iter()
                .find(|d| d.as_str() == s)
                .map(Difficulty::Sdvx),
        };
        found.ok_or_else(|| DomainError::unknown("difficulty", s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IidxLamp {
    #[serde(rename = "NO PLAY")]
    NoPlay,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "ASSIST CLEAR")]
    AssistClear,
    #[serde(rename = "EASY CLEAR")]
    EasyClear,
    #[serde(rename = "CLEAR")]
    Clear,
    #[serde(rename = "HARD CLEAR")]
    HardClear,
    #[serde(rename = "EX HARD CLEAR")]
    ExHardClear,
    #[serde(rename = "FULL COMBO")]
    FullCombo,
}

impl IidxLamp {
    pub const ALL: [IidxLamp; 8] = [
        IidxLamp::NoPlay,
        IidxLamp::Failed,
        IidxLamp::AssistClear,
        IidxLamp::EasyClear,
        IidxLamp::Clear,
        IidxLamp::HardClear,
        IidxLamp::ExHardClear,
        IidxLamp::FullCombo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IidxLamp::NoPlay => "NO PLAY",
            IidxLamp::Failed => "FAILED",
            IidxLamp::AssistClear => "ASSIST CLEAR",
            IidxLamp::EasyClear => "EASY CLEAR",
            IidxLamp::Clear => "CLEAR",
            IidxLamp::HardClear => "HARD CLEAR",
            IidxLamp::ExHardClear => "EX HARD CLEAR",
            IidxLamp::FullCombo => "FULL COMBO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SdvxLamp {
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "CLEAR")]
    Clear,
    #[serde(rename = "EXCESSIVE CLEAR")]
    ExcessiveClear,
    #[serde(rename = "ULTIMATE CHAIN")]
    UltimateChain,
    #[serde(rename = "PERFECT ULTIMATE CHAIN")]
    PerfectUltimateChain,
}

impl SdvxLamp {
    pub const ALL: [SdvxLamp; 5] = [
        SdvxLamp::Failed,
        SdvxLamp::Clear,
        SdvxLamp::ExcessiveClear,
        SdvxLamp::UltimateChain,
        SdvxLamp::PerfectUltimateChain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SdvxLamp::Failed => "FAILED",
            SdvxLamp::Clear => "CLEAR",
            SdvxLamp::ExcessiveClear => "EXCESSIVE CLEAR",
            SdvxLamp::UltimateChain => "ULTIMATE CHAIN",
            SdvxLamp::PerfectUltimateChain => "PERFECT ULTIMATE CHAIN",
        }
    }
}

/// Canonical clear-state. Both games use "FAILED" and "CLEAR", so this only
/// serializes; parsing always goes through [`Lamp::parse`] with a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Lamp {
    Iidx(IidxLamp),
    Sdvx(SdvxLamp),
}

impl Lamp {
    pub fn game(&self) -> Game {
        match self {
            Lamp::Iidx(_) => Game::Iidx,
            Lamp::Sdvx(_) => Game::Sdvx,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lamp::Iidx(l) => l.as_str(),
            Lamp::Sdvx(l) => l.as_str(),
        }
    }

    pub fn parse(game: Game, s: &str) -> Result<Self, DomainError> {
        let found = match game {
            Game::Iidx => IidxLamp::ALL
                .into_iter()
                .find(|l| l.as_str() == s)
                .map(Lamp::Iidx),
            Game::Sdvx => SdvxLamp::ALL
                .into_iter()
                .find(|l| l.as_str() == s)
                .map(Lamp::Sdvx),
        };
        found.ok_or_else(|| DomainError::unknown("lamp", s))
    }
}

impl fmt::Display for Lamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IidxGrade {
    F,
    E,
    D,
    C,
    B,
    A,
    AA,
    AAA,
    #[serde(rename = "MAX-")]
    MaxMinus,
    #[serde(rename = "MAX")]
    Max,
}

impl IidxGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            IidxGrade::F => "F",
            IidxGrade::E => "E",
            IidxGrade::D => "D",
            IidxGrade::C => "C",
            IidxGrade::B => "B",
            IidxGrade::A => "A",
            IidxGrade::AA => "AA",
            IidxGrade::AAA => "AAA",
            IidxGrade::MaxMinus => "MAX-",
            IidxGrade::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SdvxGrade {
    D,
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
    AA,
    #[serde(rename = "AA+")]
    AAPlus,
    AAA,
    #[serde(rename = "AAA+")]
    AAAPlus,
    S,
    #[serde(rename = "PUC")]
    Puc,
}

impl SdvxGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdvxGrade::D => "D",
            SdvxGrade::C => "C",
            SdvxGrade::B => "B",
            SdvxGrade::A => "A",
            SdvxGrade::APlus => "A+",
            SdvxGrade::AA => "AA",
            SdvxGrade::AAPlus => "AA+",
            SdvxGrade::AAA => "AAA",
            SdvxGrade::AAAPlus => "AAA+",
            SdvxGrade::S => "S",
            SdvxGrade::Puc => "PUC",
        }
    }
}

/// Canonical grade, derived from percent only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Grade {
    Iidx(IidxGrade),
    Sdvx(SdvxGrade),
}

impl Grade {
    pub fn game(&self) -> Game {
        match self {
            Grade::Iidx(_) => Game::Iidx,
            Grade::Sdvx(_) => Game::Sdvx,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Iidx(g) => g.as_str(),
            Grade::Sdvx(g) => g.as_str(),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
