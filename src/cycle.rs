//! Fixed symbol cycles: the five elements, ten heavenly stems, twelve
//! earthly branches, and the stem/branch pair that makes up a pillar.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "水")]
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Heavenly stem (天干)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stem {
    #[serde(rename = "甲")]
    Jia,
    #[serde(rename = "乙")]
    Yi,
    #[serde(rename = "丙")]
    Bing,
    #[serde(rename = "丁")]
    Ding,
    #[serde(rename = "戊")]
    Wu,
    #[serde(rename = "己")]
    Ji,
    #[serde(rename = "庚")]
    Geng,
    #[serde(rename = "辛")]
    Xin,
    #[serde(rename = "壬")]
    Ren,
    #[serde(rename = "癸")]
    Gui,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    /// Stem at `index` in the 10-cycle; any integer wraps.
    pub fn from_index(index: i64) -> Stem {
        Self::ALL[index.rem_euclid(10) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn element(self) -> Element {
        match self {
            Stem::Jia | Stem::Yi => Element::Wood,
            Stem::Bing | Stem::Ding => Element::Fire,
            Stem::Wu | Stem::Ji => Element::Earth,
            Stem::Geng | Stem::Xin => Element::Metal,
            Stem::Ren | Stem::Gui => Element::Water,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Stem::Jia => "甲",
            Stem::Yi => "乙",
            Stem::Bing => "丙",
            Stem::Ding => "丁",
            Stem::Wu => "戊",
            Stem::Ji => "己",
            Stem::Geng => "庚",
            Stem::Xin => "辛",
            Stem::Ren => "壬",
            Stem::Gui => "癸",
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Earthly branch (地支)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "子")]
    Zi,
    #[serde(rename = "丑")]
    Chou,
    #[serde(rename = "寅")]
    Yin,
    #[serde(rename = "卯")]
    Mao,
    #[serde(rename = "辰")]
    Chen,
    #[serde(rename = "巳")]
    Si,
    #[serde(rename = "午")]
    Wu,
    #[serde(rename = "未")]
    Wei,
    #[serde(rename = "申")]
    Shen,
    #[serde(rename = "酉")]
    You,
    #[serde(rename = "戌")]
    Xu,
    #[serde(rename = "亥")]
    Hai,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    /// Branch at `index` in the 12-cycle; any integer wraps.
    pub fn from_index(index: i64) -> Branch {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn element(self) -> Element {
        match self {
            Branch::Zi | Branch::Hai => Element::Water,
            Branch::Yin | Branch::Mao => Element::Wood,
            Branch::Si | Branch::Wu => Element::Fire,
            Branch::Shen | Branch::You => Element::Metal,
            Branch::Chou | Branch::Chen | Branch::Wei | Branch::Xu => Element::Earth,
        }
    }

    /// Hidden stems (藏干), main qi first.
    pub fn hidden_stems(self) -> &'static [Stem] {
        match self {
            Branch::Zi => &[Stem::Gui],
            Branch::Chou => &[Stem::Ji, Stem::Gui, Stem::Xin],
            Branch::Yin => &[Stem::Jia, Stem::Bing, Stem::Wu],
            Branch::Mao => &[Stem::Yi],
            Branch::Chen => &[Stem::Wu, Stem::Yi, Stem::Gui],
            Branch::Si => &[Stem::Bing, Stem::Geng, Stem::Wu],
            Branch::Wu => &[Stem::Ding, Stem::Ji],
            Branch::Wei => &[Stem::Ji, Stem::Ding, Stem::Yi],
            Branch::Shen => &[Stem::Geng, Stem::Ren, Stem::Wu],
            Branch::You => &[Stem::Xin],
            Branch::Xu => &[Stem::Wu, Stem::Xin, Stem::Ding],
            Branch::Hai => &[Stem::Ren, Stem::Jia],
        }
    }

    /// Double-hour branch for a clock hour. 23 and 0 both fall in 子.
    /// Hours past 23 wrap around the day.
    pub fn for_hour(hour: u32) -> Branch {
        Self::from_index(((hour % 24 + 1) / 2) as i64)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Branch::Zi => "子",
            Branch::Chou => "丑",
            Branch::Yin => "寅",
            Branch::Mao => "卯",
            Branch::Chen => "辰",
            Branch::Si => "巳",
            Branch::Wu => "午",
            Branch::Wei => "未",
            Branch::Shen => "申",
            Branch::You => "酉",
            Branch::Xu => "戌",
            Branch::Hai => "亥",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// One name per consecutive pair of the sexagenary cycle, 甲子乙丑 first.
const NA_YIN: [&str; 30] = [
    "海中金", "爐中火", "大林木", "路旁土", "劍鋒金", "山頭火", "澗下水", "城頭土", "白蠟金",
    "楊柳木", "泉中水", "屋上土", "霹靂火", "松柏木", "長流水", "砂中金", "山下火", "平地木",
    "壁上土", "金箔金", "覆燈火", "天河水", "大驛土", "釵釧金", "桑柘木", "大溪水", "沙中土",
    "天上火", "石榴木", "大海水",
];

/// A (stem, branch) pair for one of the four calendrical positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pillar {
    pub stem: Stem,
    pub branch: Branch,
}

impl Pillar {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Position in the 60-pair cycle (甲子 = 0). Pairs whose stem and branch
    /// indices differ in parity never occur in the cycle.
    pub fn sexagenary_index(&self) -> Option<usize> {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        if s % 2 != b % 2 {
            return None;
        }
        Some((6 * s - 5 * b).rem_euclid(60) as usize)
    }

    /// Sound element (納音) of the pair
    pub fn na_yin(&self) -> Option<&'static str> {
        self.sexagenary_index().map(|i| NA_YIN[i / 2])
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}
