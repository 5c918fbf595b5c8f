use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, StrengthThresholds, TallyWeights};
use crate::cycle::{Element, Pillar};
use crate::error::{BaziError, Result};
use crate::pillar::{calculate_for, BirthMoment, FourPillars};

/// Weighted score per element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementTally {
    #[serde(rename = "木")]
    pub wood: f64,
    #[serde(rename = "火")]
    pub fire: f64,
    #[serde(rename = "土")]
    pub earth: f64,
    #[serde(rename = "金")]
    pub metal: f64,
    #[serde(rename = "水")]
    pub water: f64,
}

impl ElementTally {
    /// Scores in `Element::ALL` order
    pub fn from_scores(scores: [f64; 5]) -> Self {
        let [wood, fire, earth, metal, water] = scores;
        Self {
            wood,
            fire,
            earth,
            metal,
            water,
        }
    }

    pub fn scores(&self) -> [f64; 5] {
        [self.wood, self.fire, self.earth, self.metal, self.water]
    }

    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::Wood => self.wood,
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Metal => self.metal,
            Element::Water => self.water,
        }
    }

    pub fn total(&self) -> f64 {
        self.scores().iter().sum()
    }

    /// Each score as a percentage of the total
    pub fn percentages(&self) -> Result<ElementTally> {
        let total = self.total();
        // Also rejects NaN.
        if !(total > 0.0) {
            return Err(BaziError::DegenerateInput(format!(
                "element tally sums to {}",
                total
            )));
        }
        Ok(Self::from_scores(self.scores().map(|v| v / total * 100.0)))
    }
}

/// Day-master strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    pub fn from_percentage(share: f64) -> Self {
        Self::from_percentage_with(share, &StrengthThresholds::default())
    }

    pub fn from_percentage_with(share: f64, thresholds: &StrengthThresholds) -> Self {
        if share > thresholds.strong_above {
            Strength::Strong
        } else if share < thresholds.weak_below {
            Strength::Weak
        } else {
            Strength::Medium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Strength::Weak => "弱",
            Strength::Medium => "中",
            Strength::Strong => "強",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementalProfile {
    pub day_element: Element,
    pub strength: Strength,
    /// Day-master share of the tally, in percent
    pub day_share: f64,
    pub favorable: [Element; 2],
    pub unfavorable: [Element; 2],
    pub tally: ElementTally,
    pub percentages: ElementTally,
}

impl ElementalProfile {
    pub fn is_favorable(&self, element: Element) -> bool {
        self.favorable.contains(&element)
    }
}

/// Favorable and unfavorable pairs for a day element. Strong day masters
/// want to be drained or restrained; medium and weak ones want support.
pub fn favorable_elements(day: Element, strength: Strength) -> ([Element; 2], [Element; 2]) {
    use Element::*;
    match (day, strength == Strength::Strong) {
        (Wood, true) => ([Metal, Fire], [Water, Wood]),
        (Fire, true) => ([Water, Earth], [Wood, Fire]),
        (Earth, true) => ([Wood, Metal], [Fire, Earth]),
        (Metal, true) => ([Fire, Water], [Earth, Metal]),
        (Water, true) => ([Earth, Wood], [Metal, Water]),
        (Wood, false) => ([Water, Fire], [Metal, Earth]),
        (Fire, false) => ([Wood, Earth], [Water, Metal]),
        (Earth, false) => ([Fire, Metal], [Wood, Water]),
        (Metal, false) => ([Earth, Water], [Fire, Wood]),
        (Water, false) => ([Metal, Wood], [Earth, Fire]),
    }
}

pub fn tally(pillars: &FourPillars) -> ElementTally {
    tally_pillars(&pillars.pillars(), &TallyWeights::default())
}

/// Weighted element tally over any set of pillars.
///
/// Contributions are counted as integers per element and weighted once at
/// the end, so the result does not depend on pillar order.
pub fn tally_pillars(pillars: &[Pillar], weights: &TallyWeights) -> ElementTally {
    let mut stems = [0u32; 5];
    let mut branches = [0u32; 5];
    let mut hidden = [0u32; 5];

    for pillar in pillars {
        stems[pillar.stem.element() as usize] += 1;
        branches[pillar.branch.element() as usize] += 1;
        for stem in pillar.branch.hidden_stems() {
            hidden[stem.element() as usize] += 1;
        }
    }

    let mut scores = [0.0; 5];
    for (i, score) in scores.iter_mut().enumerate() {
        *score = stems[i] as f64 * weights.stem
            + branches[i] as f64 * weights.branch
            + hidden[i] as f64 * weights.hidden_stem;
    }
    ElementTally::from_scores(scores)
}

pub fn classify(pillars: &FourPillars, tally: &ElementTally) -> Result<ElementalProfile> {
    classify_with(pillars, tally, &StrengthThresholds::default())
}

pub fn classify_with(
    pillars: &FourPillars,
    tally: &ElementTally,
    thresholds: &StrengthThresholds,
) -> Result<ElementalProfile> {
    let percentages = tally.percentages()?;
    let day_element = pillars.day.stem.element();
    let day_share = percentages.get(day_element);
    let strength = Strength::from_percentage_with(day_share, thresholds);
    let (favorable, unfavorable) = favorable_elements(day_element, strength);

    tracing::debug!(
        day_element = %day_element,
        day_share,
        strength = ?strength,
        "Classified day master"
    );

    Ok(ElementalProfile {
        day_element,
        strength,
        day_share,
        favorable,
        unfavorable,
        tally: *tally,
        percentages,
    })
}

/// Tally then classify with default weights and thresholds
pub fn profile(pillars: &FourPillars) -> Result<ElementalProfile> {
    classify(pillars, &tally(pillars))
}

/// Pillars plus elemental profile for one birth moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub birth: BirthMoment,
    pub pillars: FourPillars,
    pub elemental_profile: ElementalProfile,
}

impl Chart {
    pub fn compute(birth: BirthMoment, config: &AppConfig) -> Result<Self> {
        let pillars = calculate_for(&birth);
        let tally = tally_pillars(&pillars.pillars(), &config.weights);
        let elemental_profile = classify_with(&pillars, &tally, &config.thresholds)?;
        Ok(Self {
            birth,
            pillars,
            elemental_profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::{Branch, Stem};
    use crate::pillar::calculate;
    use chrono::{Datelike, NaiveDate};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn pillars_with_day(stem: Stem) -> FourPillars {
        let filler = Pillar::new(Stem::Jia, Branch::Zi);
        FourPillars::new(filler, filler, Pillar::new(stem, Branch::Zi), filler)
    }

    #[test]
    fn test_tally_1990_chart() {
        // 庚午 丙寅 壬辰 甲辰
        let chart = calculate(1990, 1, 1, 8).unwrap();
        let t = tally(&chart);

        assert!(approx(t.wood, 2.4), "wood = {}", t.wood);
        assert!(approx(t.fire, 2.1), "fire = {}", t.fire);
        assert!(approx(t.earth, 2.2), "earth = {}", t.earth);
        assert!(approx(t.metal, 1.0), "metal = {}", t.metal);
        assert!(approx(t.water, 1.6), "water = {}", t.water);
        assert!(approx(t.total(), 9.3));
    }

    #[test]
    fn test_profile_1990_chart() {
        let chart = calculate(1990, 1, 1, 8).unwrap();
        let p = profile(&chart).unwrap();

        assert_eq!(p.day_element, Element::Water);
        // 1.6 / 9.3 ≈ 17.2%
        assert_eq!(p.strength, Strength::Medium);
        assert_eq!(p.favorable, [Element::Metal, Element::Wood]);
        assert_eq!(p.unfavorable, [Element::Earth, Element::Fire]);
        assert!(approx(p.percentages.total(), 100.0));
    }

    #[test]
    fn test_tally_is_order_independent() {
        let chart = calculate(1987, 7, 19, 21).unwrap();
        let base = chart.pillars();
        let expected = tally_pillars(&base, &TallyWeights::default()).scores();

        let orders = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [1, 3, 0, 2],
            [2, 0, 3, 1],
            [3, 0, 1, 2],
            [1, 2, 3, 0],
        ];
        for order in orders {
            let permuted = order.map(|i| base[i]);
            let scores = tally_pillars(&permuted, &TallyWeights::default()).scores();
            for (a, b) in scores.iter().zip(expected.iter()) {
                assert_eq!(a.to_bits(), b.to_bits(), "order {:?}", order);
            }
        }
    }

    #[test]
    fn test_earth_heavy_tally_is_strong() {
        let pillars = pillars_with_day(Stem::Wu);
        let t = ElementTally::from_scores([1.0, 1.0, 4.0, 0.0, 0.0]);

        let p = classify(&pillars, &t).unwrap();
        assert_eq!(p.day_element, Element::Earth);
        assert!((p.day_share - 66.666).abs() < 0.01);
        assert_eq!(p.strength, Strength::Strong);
        assert_eq!(p.favorable, [Element::Wood, Element::Metal]);
        assert_eq!(p.unfavorable, [Element::Fire, Element::Earth]);
    }

    #[test]
    fn test_zero_tally_is_degenerate() {
        let pillars = pillars_with_day(Stem::Jia);
        let result = classify(&pillars, &ElementTally::default());
        assert!(matches!(result, Err(BaziError::DegenerateInput(_))));
    }

    #[test]
    fn test_strength_boundaries() {
        assert_eq!(Strength::from_percentage(30.0), Strength::Medium);
        assert_eq!(Strength::from_percentage(30.000_001), Strength::Strong);
        assert_eq!(Strength::from_percentage(15.0), Strength::Medium);
        assert_eq!(Strength::from_percentage(14.999_999), Strength::Weak);
        assert_eq!(Strength::from_percentage(0.0), Strength::Weak);
        assert_eq!(Strength::from_percentage(100.0), Strength::Strong);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = StrengthThresholds {
            strong_above: 50.0,
            weak_below: 10.0,
        };
        assert_eq!(Strength::from_percentage_with(40.0, &thresholds), Strength::Medium);
        assert_eq!(Strength::from_percentage_with(5.0, &thresholds), Strength::Weak);
    }

    #[test]
    fn test_favorable_sets_disjoint_and_sized() {
        for element in Element::ALL {
            for strength in [Strength::Weak, Strength::Medium, Strength::Strong] {
                let (fav, unfav) = favorable_elements(element, strength);
                assert_ne!(fav[0], fav[1]);
                assert_ne!(unfav[0], unfav[1]);
                for e in fav {
                    assert!(!unfav.contains(&e), "{} {:?}", element, strength);
                }
            }
        }
    }

    #[test]
    fn test_medium_uses_weak_row() {
        for element in Element::ALL {
            assert_eq!(
                favorable_elements(element, Strength::Medium),
                favorable_elements(element, Strength::Weak)
            );
        }
    }

    #[test]
    fn test_strong_day_element_can_be_unfavorable() {
        let (_, unfav) = favorable_elements(Element::Wood, Strength::Strong);
        assert!(unfav.contains(&Element::Wood));
    }

    #[test]
    fn test_valid_charts_never_degenerate() {
        let mut date = NaiveDate::from_ymd_opt(1999, 12, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
        while date < end {
            for hour in [0, 7, 13, 23] {
                let chart = calculate(date.year(), date.month(), date.day(), hour).unwrap();
                let t = tally(&chart);
                assert!(t.total() >= 4.0);
                assert!(t.scores().iter().all(|v| *v >= 0.0));
                assert!(classify(&chart, &t).is_ok());
            }
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_chart_compute_uses_config() {
        let birth = BirthMoment::new(1990, 1, 1, 8).unwrap();
        let mut config = AppConfig::default();
        config.weights.hidden_stem = 0.0;

        let chart = Chart::compute(birth, &config).unwrap();
        // Without hidden stems water is 1.0 out of 6.0.
        assert!(approx(chart.elemental_profile.tally.water, 1.0));
        assert!(approx(chart.elemental_profile.tally.total(), 6.0));
        assert_eq!(chart.elemental_profile.strength, Strength::Medium);
    }

    #[test]
    fn test_profile_json_shape() {
        let chart = calculate(1990, 1, 1, 8).unwrap();
        let p = profile(&chart).unwrap();
        let json = serde_json::to_value(&p).unwrap();

        assert_eq!(json["day_element"], "水");
        assert_eq!(json["strength"], "medium");
        assert_eq!(json["favorable"], serde_json::json!(["金", "木"]));
        assert!(json["tally"]["木"].is_number());
    }
}
