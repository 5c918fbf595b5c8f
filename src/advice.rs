//! Canned advice text keyed by day element and strength.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cycle::{Branch, Element};
use crate::pillar::FourPillars;
use crate::scoring::{Chart, ElementalProfile, Strength};

const UNKNOWN_NA_YIN: &str = "未知";

/// Opening analysis paragraph block
pub fn overall_analysis(chart: &Chart) -> String {
    let profile = &chart.elemental_profile;
    let join = |elements: &[Element; 2]| {
        elements
            .iter()
            .map(|e| e.symbol())
            .collect::<Vec<_>>()
            .join("、")
    };
    let [year, month, day, hour] = chart.pillars.na_yin().map(|n| n.unwrap_or(UNKNOWN_NA_YIN));

    let mut text = format!(
        "這位寶寶八字日主為{}，五行{}。",
        profile.day_element,
        profile.strength.label()
    );
    text.push_str(&format!(
        "\n\n根據八字分析，有利五行為{}，不利五行為{}。",
        join(&profile.favorable),
        join(&profile.unfavorable)
    ));
    text.push_str(&format!(
        "\n\n年柱納音為{}，月柱納音為{}，日柱納音為{}，時柱納音為{}。",
        year, month, day, hour
    ));
    text.push_str("\n\n");
    text.push_str(element_character(profile.day_element));
    text
}

fn element_character(element: Element) -> &'static str {
    match element {
        Element::Wood => "木主仁，代表成長、發展和創新。這位寶寶天生具有活力和進取心，喜歡探索和學習新事物。在成長過程中，需要給予足夠的自由空間和鼓勵，同時也要培養耐心和專注力。",
        Element::Fire => "火主禮，代表熱情、活力和表達。這位寶寶天生具有熱情和創造力，善於表達和社交。在成長過程中，需要幫助調節情緒和能量，培養專注力和持久力。",
        Element::Earth => "土主信，代表穩重、踏實和包容。這位寶寶天生具有責任感和可靠性，重視家庭和傳統。在成長過程中，需要鼓勵嘗試新事物，培養靈活性和創造力。",
        Element::Metal => "金主義，代表果斷、公正和自律。這位寶寶天生具有條理性和判斷力，做事認真負責。在成長過程中，需要培養情感表達和靈活性，避免過於嚴格和固執。",
        Element::Water => "水主智，代表智慧、靈活和適應力。這位寶寶天生具有思考能力和適應性，善於理解和溝通。在成長過程中，需要培養執行力和堅持性，避免過於猶豫不決。",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    pub tags: Vec<String>,
    pub details: Vec<String>,
    pub summary: String,
}

const MAX_TAGS: usize = 8;
const MIN_TAGS: usize = 5;
const FILLER_TAGS: [&str; 3] = ["溫和親近", "學習導向", "創意潛能"];

/// Personality tags (5–8) with supporting detail lines
pub fn personality(pillars: &FourPillars, profile: &ElementalProfile) -> Personality {
    let mut tags: Vec<&str> = Vec::new();
    let mut details: Vec<&str> = Vec::new();

    let (base_tags, base_details) = match profile.day_element {
        Element::Wood => (
            ["好奇心旺", "依附敏感", "成長導向"],
            [
                "木質寶寶天生好奇，對新事物充滿興趣，喜歡探索環境。",
                "對主要照顧者依附性較強，需要穩定的情感連結。",
                "具有強烈的成長慾望，學習能力佳，適應力強。",
            ],
        ),
        Element::Fire => (
            ["活力充沛", "表達豐富", "情緒波動"],
            [
                "火質寶寶精力旺盛，喜歡互動和表達，反應敏捷。",
                "情感表達直接豐富，容易感染他人情緒。",
                "情緒變化較快，需要耐心引導情緒管理。",
            ],
        ),
        Element::Earth => (
            ["規律依賴", "可安撫", "穩定需求"],
            [
                "土質寶寶喜歡規律作息，對環境變化較為敏感。",
                "容易被安撫，喜歡重複性的安全感活動。",
                "需要穩定的環境和照顧模式，適應新環境需要時間。",
            ],
        ),
        Element::Metal => (
            ["秩序偏好", "精細敏感", "自律傾向"],
            [
                "金質寶寶喜歡有序的環境，對細節變化敏感。",
                "觸覺和聽覺較為敏銳，容易受環境刺激影響。",
                "具有自我調節的潛力，但需要適當的引導和支持。",
            ],
        ),
        Element::Water => (
            ["適應靈活", "觀察敏銳", "內向傾向"],
            [
                "水質寶寶適應能力強，能夠靈活應對環境變化。",
                "觀察力敏銳，喜歡靜靜觀察周圍的人事物。",
                "可能較為內向，需要溫和的鼓勵來表達自己。",
            ],
        ),
    };
    tags.extend(base_tags);
    details.extend(base_details);

    let (strength_tag, strength_detail) = match profile.strength {
        Strength::Strong => (
            "自主性強",
            "寶寶自主性較強，有自己的想法和偏好，需要尊重其個性。",
        ),
        Strength::Weak => (
            "需要支持",
            "寶寶較需要外在支持和鼓勵，在安全感充足時表現更佳。",
        ),
        Strength::Medium => (
            "平衡發展",
            "寶寶各方面發展較為平衡，容易建立穩定的作息和習慣。",
        ),
    };
    tags.push(strength_tag);
    details.push(strength_detail);

    let branches = pillars.branches();
    let count = |group: &[Branch]| branches.iter().filter(|b| group.contains(b)).count();

    if count(&[Branch::Zi, Branch::Hai]) >= 2 {
        tags.push("情感豐富");
        details.push("情感世界豐富，對情緒變化敏感，需要情感上的理解和支持。");
    }
    if count(&[Branch::Wu, Branch::Si]) >= 2 {
        tags.push("社交傾向");
        details.push("喜歡與人互動，在社交環境中表現活躍，容易成為注意焦點。");
    }
    if count(&[Branch::Chou, Branch::Chen, Branch::Wei, Branch::Xu]) >= 2 {
        tags.push("安全導向");
        details.push("對安全感需求較高，喜歡熟悉的環境和人物，變化需要循序漸進。");
    }

    tags.truncate(MAX_TAGS);
    for filler in FILLER_TAGS {
        if tags.len() >= MIN_TAGS {
            break;
        }
        if !tags.contains(&filler) {
            tags.push(filler);
        }
    }

    let summary = format!(
        "根據八字分析，寶寶具有{}等特質，建議照顧者針對這些特點制定相應的照護策略。",
        tags.join("、")
    );

    Personality {
        tags: tags.into_iter().map(String::from).collect(),
        details: details.into_iter().map(String::from).collect(),
        summary,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPhase {
    pub age: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifeStage {
    EarlyChildhood,
    Preschool,
    Elementary,
}

/// Advice for the 0-3, 4-6 and 7-10 year stages
pub fn growth_phases(profile: &ElementalProfile) -> Vec<GrowthPhase> {
    [
        ("0-3歲", "基礎發展期", LifeStage::EarlyChildhood),
        ("4-6歲", "探索學習期", LifeStage::Preschool),
        ("7-10歲", "能力培養期", LifeStage::Elementary),
    ]
    .into_iter()
    .map(|(age, title, stage)| GrowthPhase {
        age: age.into(),
        title: title.into(),
        description: stage_advice(stage, profile.day_element, profile.strength),
    })
    .collect()
}

fn stage_advice(stage: LifeStage, element: Element, strength: Strength) -> String {
    use Element::*;
    use LifeStage::*;

    // (base, strong suffix, otherwise suffix)
    let (base, strong, other) = match (stage, element) {
        (EarlyChildhood, Wood) => (
            "木性寶寶在幼年期需要充分的自由空間和探索機會。",
            "木性較強，可能較為固執，建議適當引導而非強制，培養耐心和專注力。",
            "木性較弱，需要多鼓勵表達和嘗試，增強自信心，提供穩定的環境。",
        ),
        (EarlyChildhood, Fire) => (
            "火性寶寶在幼年期需要適當的情感表達和社交互動。",
            "火性較強，情緒可能波動大，需要幫助調節情緒，建立規律作息。",
            "火性較弱，需要多一些溫暖的互動和鼓勵，培養表達能力和自信心。",
        ),
        (EarlyChildhood, Earth) => (
            "土性寶寶在幼年期需要穩定的環境和明確的界限。",
            "土性較強，可能較為固執保守，需要鼓勵嘗試新事物，培養靈活性。",
            "土性較弱，需要建立安全感和規律性，幫助形成良好的生活習慣。",
        ),
        (EarlyChildhood, Metal) => (
            "金性寶寶在幼年期需要秩序和結構化的環境。",
            "金性較強，可能較為固執和完美主義，需要學習接受不完美，培養彈性。",
            "金性較弱，需要幫助建立自律和秩序感，培養專注力和堅持力。",
        ),
        (EarlyChildhood, Water) => (
            "水性寶寶在幼年期需要豐富的認知刺激和學習機會。",
            "水性較強，思維活躍，可能注意力不集中，需要幫助建立專注力和耐心。",
            "水性較弱，需要多提供探索和學習的機會，培養好奇心和思考能力。",
        ),
        (Preschool, Wood) => (
            "木性寶寶在學前期適合參與創意和自然相關活動，培養組織能力和領導力。",
            "木性較強，需要學習合作和分享，可以參加團體活動培養社交能力。",
            "木性較弱，需要鼓勵主動表達想法，培養決策能力和自信心。",
        ),
        (Preschool, Fire) => (
            "火性寶寶在學前期適合參與表演和藝術活動，培養創造力和表達能力。",
            "火性較強，需要學習專注和耐心，可以通過靜態活動如繪畫來平衡能量。",
            "火性較弱，需要多鼓勵參與互動和表演活動，增強自信和表現力。",
        ),
        (Preschool, Earth) => (
            "土性寶寶在學前期適合參與結構化和實用性活動，培養責任感和踏實性。",
            "土性較強，需要增加創意和想像力的培養，避免過於死板。",
            "土性較弱，需要建立明確的規則和期望，培養自律和責任感。",
        ),
        (Preschool, Metal) => (
            "金性寶寶在學前期適合參與精細動作和邏輯思維活動，培養專注力和分析能力。",
            "金性較強，需要增加創意和情感表達的活動，避免過於嚴肅。",
            "金性較弱，需要培養條理性和完成任務的能力，建立自信心。",
        ),
        (Preschool, Water) => (
            "水性寶寶在學前期適合參與探索和認知活動，培養思考能力和適應力。",
            "水性較強，需要建立規律和界限，幫助集中注意力和完成任務。",
            "水性較弱，需要鼓勵好奇心和提問，培養獨立思考能力。",
        ),
        (Elementary, Wood) => (
            "木性寶寶在小學階段適合發展組織能力和創新思維，培養領導才能。",
            "木性較強，需要學習傾聽和尊重他人意見，培養團隊合作精神。",
            "木性較弱，需要鼓勵參與決策和表達觀點，增強自信和堅持力。",
        ),
        (Elementary, Fire) => (
            "火性寶寶在小學階段適合發展創造力和表達能力，培養社交技巧。",
            "火性較強，需要學習專注和深入思考，培養耐心和毅力。",
            "火性較弱，需要鼓勵積極參與和表現自我，培養熱情和活力。",
        ),
        (Elementary, Earth) => (
            "土性寶寶在小學階段適合發展實用技能和責任感，培養穩定性和可靠性。",
            "土性較強，需要鼓勵嘗試新事物和接受變化，培養靈活性。",
            "土性較弱，需要幫助建立自律和時間管理能力，培養堅持力。",
        ),
        (Elementary, Metal) => (
            "金性寶寶在小學階段適合發展邏輯思維和分析能力，培養精確性和判斷力。",
            "金性較強，需要培養情感表達和同理心，避免過於批判。",
            "金性較弱，需要幫助建立自信和決斷力，培養獨立思考能力。",
        ),
        (Elementary, Water) => (
            "水性寶寶在小學階段適合發展思考能力和創新思維，培養適應力和洞察力。",
            "水性較強，需要學習實踐和執行力，將想法轉化為行動。",
            "水性較弱，需要鼓勵獨立思考和問題解決，培養智慧和靈活性。",
        ),
    };

    let suffix = if strength == Strength::Strong { strong } else { other };
    format!("{}{}", base, suffix)
}

/// Group-life (kindergarten / classroom) advice
pub fn group_life_advice(profile: &ElementalProfile) -> Vec<String> {
    let base: [&str; 3] = match profile.day_element {
        Element::Wood => [
            "鼓勵參與需要創意和領導的團體活動",
            "教導分享和輪流的概念",
            "培養團隊合作精神，學習聆聽他人意見",
        ],
        Element::Fire => [
            "提供表達和展示的機會",
            "教導情緒管理和同理心",
            "鼓勵參與互動性強的團體遊戲",
        ],
        Element::Earth => [
            "安排穩定的團體環境和固定夥伴",
            "鼓勵承擔小組責任和幫助他人",
            "逐步適應團體規則和變化",
        ],
        Element::Metal => [
            "提供清晰的團體規則和期望",
            "鼓勵參與有組織的活動",
            "培養公平競爭和遵守規則的精神",
        ],
        Element::Water => [
            "提供安靜和諧的團體環境",
            "鼓勵深度交流和建立友誼",
            "培養傾聽和理解他人的能力",
        ],
    };

    let mut advice: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    advice.push(
        if profile.strength == Strength::Strong {
            "需要學習謙讓和包容，避免過於堅持己見"
        } else {
            "需要鼓勵表達想法，增強在團體中的自信心"
        }
        .into(),
    );

    for element in Element::ALL {
        if !profile.is_favorable(element) {
            continue;
        }
        let activity = match element {
            Element::Wood => "適合參與戶外和自然相關的團體活動",
            Element::Fire => "適合參與熱鬧和互動性強的團體活動",
            Element::Earth => "適合參與穩定和有規律的團體活動",
            Element::Metal => "適合參與有組織和競爭性的團體活動",
            Element::Water => "適合參與安靜和需要專注的團體活動",
        };
        advice.push(activity.into());
    }

    advice
}

/// Traits for one school-age band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTraits {
    pub age: String,
    pub traits: Vec<String>,
}

const INFANT_BASE_TRAITS: [&str; 4] = [
    "天生氣質較為敏感，對環境變化反應明顯",
    "情緒表達直接，哭鬧時需要耐心安撫",
    "對聲音和光線較為敏感，需要溫和的環境",
    "依賴性強，需要充分的安全感",
];

const PRESCHOOL_BASE_TRAITS: [&str; 4] = [
    "好奇心旺盛，喜歡探索和提問",
    "想像力豐富，創造力開始顯現",
    "情緒波動較大，需要學習情緒管理",
    "開始展現獨立性，但仍需要指導",
];

const EARLY_SCHOOL_BASE_TRAITS: [&str; 4] = [
    "學習能力強，對知識有渴望",
    "社交能力發展，開始建立友誼",
    "責任感逐漸形成，能承擔簡單任務",
    "自我意識增強，開始有自己的想法",
];

const MIDDLE_SCHOOL_BASE_TRAITS: [&str; 4] = [
    "邏輯思維能力增強，能理解複雜概念",
    "價值觀開始形成，對公平正義有概念",
    "同儕關係重要性增加",
    "開始關注自己的能力和表現",
];

fn infant_trait(element: Element) -> &'static str {
    match element {
        Element::Wood => "活潑好動，精力充沛，需要足夠的活動空間",
        Element::Fire => "情緒變化快，表達能力強，喜歡與人互動",
        Element::Earth => "性格溫和穩定，適應能力較強，容易建立規律",
        Element::Metal => "反應敏銳，對規律性要求高，喜歡清潔整齊的環境",
        Element::Water => "聰明靈活，學習能力強，但可能較為敏感",
    }
}

fn preschool_trait(element: Element) -> &'static str {
    match element {
        Element::Wood => "喜歡戶外活動，對自然事物特別感興趣",
        Element::Fire => "表達欲強，喜歡表演和展示，社交能力發展快",
        Element::Earth => "做事認真負責，喜歡幫助他人，有強烈的歸屬感",
        Element::Metal => "邏輯思維能力強，喜歡規則和秩序，做事有條理",
        Element::Water => "適應能力強，學習新事物快，但可能缺乏持久力",
    }
}

fn early_school_trait(element: Element) -> &'static str {
    match element {
        Element::Wood => "創新思維活躍，喜歡嘗試新方法解決問題",
        Element::Fire => "領導能力強，喜歡組織活動，但需要學習耐心",
        Element::Earth => "學習踏實認真，記憶力好，但可能缺乏創新思維",
        Element::Metal => "分析能力強，做事有計劃，但可能過於追求完美",
        Element::Water => "理解能力強，善於溝通，但可能缺乏堅持性",
    }
}

fn middle_school_trait(element: Element) -> &'static str {
    match element {
        Element::Wood => "具有開拓精神，喜歡挑戰，但需要學習堅持",
        Element::Fire => "熱情積極，善於激勵他人，但需要控制衝動",
        Element::Earth => "穩重可靠，有強烈的責任感，但可能過於保守",
        Element::Metal => "原則性強，有正義感，但可能過於嚴格",
        Element::Water => "思維靈活，善於變通，但可能缺乏原則性",
    }
}

/// Four shared traits per band plus one for the day element. Strength does
/// not change these.
pub fn stage_traits(profile: &ElementalProfile) -> Vec<StageTraits> {
    let element = profile.day_element;
    [
        ("0-2歲", INFANT_BASE_TRAITS, infant_trait(element)),
        ("3-5歲", PRESCHOOL_BASE_TRAITS, preschool_trait(element)),
        ("6-8歲", EARLY_SCHOOL_BASE_TRAITS, early_school_trait(element)),
        ("9-10歲", MIDDLE_SCHOOL_BASE_TRAITS, middle_school_trait(element)),
    ]
    .into_iter()
    .map(|(age, base, extra)| StageTraits {
        age: age.into(),
        traits: base.iter().chain([extra].iter()).map(|s| s.to_string()).collect(),
    })
    .collect()
}

/// Learning, communication, interest and health advice for the day element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicAdvice {
    pub learning_style: Vec<String>,
    pub communication: Vec<String>,
    pub interests: Vec<String>,
    pub constitution: String,
    pub diet: String,
    pub exercise: String,
}

fn learning_style(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => ["體驗式學習：通過實際操作和體驗來學習", "戶外學習：結合自然環境進行學習", "創新思維：鼓勵創新和獨立思考"],
        Element::Fire => ["互動式學習：通過討論和交流來學習", "視覺學習：使用圖表、圖片和色彩豐富的教材", "表演學習：通過角色扮演和表演來學習"],
        Element::Earth => ["循序漸進：按部就班，不急於求成", "重複練習：通過反覆練習來鞏固知識", "實用導向：注重知識的實際應用"],
        Element::Metal => ["邏輯學習：注重邏輯推理和分析", "結構化學習：建立清晰的知識結構", "精確學習：注重細節和準確性"],
        Element::Water => ["靈活學習：採用多種學習方法", "聯想學習：通過聯想和類比來學習", "適應性學習：根據情況調整學習策略"],
    }
}

fn communication_style(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => ["給予充分的自由和空間表達", "鼓勵創新思維和獨立見解", "避免過度限制和約束"],
        Element::Fire => ["保持熱情和積極的態度", "及時給予回應和互動", "幫助控制情緒和衝動"],
        Element::Earth => ["耐心傾聽，給予充分的表達機會", "使用溫和穩定的語調", "建立信任和安全感"],
        Element::Metal => ["邏輯清晰，條理分明", "設定清晰的界限和期望", "尊重孩子的原則和標準"],
        Element::Water => ["靈活調整溝通方式", "善於引導和啟發", "避免過於強硬的態度"],
    }
}

fn interest_development(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => ["自然探索：園藝、生物觀察、戶外活動", "創意藝術：繪畫、手工、設計", "體育運動：跑步、攀岩、球類運動"],
        Element::Fire => ["表演藝術：舞蹈、戲劇、演講", "社交活動：團隊運動、社團活動", "創作表達：寫作、音樂、攝影"],
        Element::Earth => ["實用技能：烹飪、手工、建築模型", "收藏整理：郵票、書籍、模型", "服務活動：志願服務、幫助他人"],
        Element::Metal => ["邏輯思維：數學、編程、棋類", "精密技能：樂器、書法、繪畫", "競技運動：武術、體操、射擊"],
        Element::Water => ["語言學習：外語、文學、演講", "水上運動：游泳、划船、衝浪", "智力遊戲：圍棋、象棋、益智遊戲"],
    }
}

/// Constitution, diet and exercise lines
fn health_advice(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => [
            "體質特點：肝膽系統較為敏感，容易緊張和焦慮。建議多進行戶外活動，保持心情愉快，避免過度壓力。",
            "飲食建議：多吃綠色蔬菜和酸味食物，如菠菜、青椒、檸檬等。避免過於油膩和辛辣的食物。",
            "運動建議：適合戶外運動和伸展性運動，如跑步、瑜伽、太極等。運動強度適中，重在舒展筋骨。",
        ],
        Element::Fire => [
            "體質特點：心血管系統活躍，精力充沛但容易上火。建議保持規律作息，避免過度興奮，注意心理平衡。",
            "飲食建議：多吃紅色食物和苦味食物，如番茄、紅棗、苦瓜等。避免過於寒涼和生冷的食物。",
            "運動建議：適合有氧運動和團體運動，如游泳、籃球、舞蹈等。注意控制運動強度，避免過度興奮。",
        ],
        Element::Earth => [
            "體質特點：脾胃系統穩定，消化能力較好但可能偏胖。建議均衡飲食，適量運動，避免暴飲暴食。",
            "飲食建議：多吃黃色食物和甘味食物，如南瓜、玉米、蜂蜜等。避免過於油膩和難消化的食物。",
            "運動建議：適合穩定性運動和力量訓練，如散步、舉重、體操等。運動要持之以恆，循序漸進。",
        ],
        Element::Metal => [
            "體質特點：肺部系統敏感，呼吸道較為脆弱。建議保持空氣清新，避免污染環境，注意呼吸道保護。",
            "飲食建議：多吃白色食物和辛味食物，如白蘿蔔、梨子、生薑等。避免過於燥熱和刺激的食物。",
            "運動建議：適合呼吸性運動和精確性運動，如深呼吸、射箭、武術等。注重動作的準確性和規範性。",
        ],
        Element::Water => [
            "體質特點：腎臟系統較為敏感，水液代謝活躍。建議保持充足睡眠，避免過度勞累，注意腰腎保護。",
            "飲食建議：多吃黑色食物和鹹味食物，如黑豆、海帶、核桃等。避免過於溫燥和上火的食物。",
            "運動建議：適合流動性運動和水上運動，如游泳、划船、柔軟體操等。運動要靈活多變，避免過於激烈。",
        ],
    }
}

pub fn topic_advice(profile: &ElementalProfile) -> TopicAdvice {
    let element = profile.day_element;
    let owned = |items: [&str; 3]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let [constitution, diet, exercise] = health_advice(element);

    TopicAdvice {
        learning_style: owned(learning_style(element)),
        communication: owned(communication_style(element)),
        interests: owned(interest_development(element)),
        constitution: constitution.into(),
        diet: diet.into(),
        exercise: exercise.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeStageSummary {
    pub age: String,
    pub summary: String,
}

/// 0-6 year overview: highlights, three age bands and group-life advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub personality_highlights: Vec<String>,
    pub age_stages: Vec<AgeStageSummary>,
    pub group_life_advice: Vec<String>,
}

fn personality_highlights(element: Element, strength: Strength) -> Vec<String> {
    let base: [&str; 4] = match element {
        Element::Wood => ["富有創造力和想像力", "喜歡探索和學習新事物", "具有成長導向的思維", "天生的領導潛質"],
        Element::Fire => ["熱情活潑，表達能力強", "情感豐富，善於社交", "具有藝術天賦和創造力", "樂觀積極的生活態度"],
        Element::Earth => ["穩重可靠，適應力強", "具有責任感和耐心", "善於照顧他人", "實用主義的思考方式"],
        Element::Metal => ["邏輯思維清晰", "注重秩序和規律", "具有分析和判斷能力", "追求完美和精確"],
        Element::Water => ["感受力敏銳，直覺力強", "善於傾聽和理解他人", "具有深度思考能力", "適應變化的靈活性"],
    };
    let extra = match (element, strength == Strength::Strong) {
        (Element::Wood, true) => "個性較為堅持，需要引導學習妥協",
        (Element::Fire, true) => "情緒表達強烈，需要學習情緒管理",
        (Element::Earth, true) => "可能較為固執，需要鼓勵接受新事物",
        (Element::Metal, true) => "標準較高，需要學習包容和彈性",
        (Element::Water, true) => "情感深刻，需要適當的情緒出口",
        (Element::Wood, false) => "需要鼓勵表達想法，增強自信心",
        (Element::Fire, false) => "需要多一些溫暖互動，培養表達能力",
        (Element::Earth, false) => "需要穩定環境，逐步建立安全感",
        (Element::Metal, false) => "需要清晰指導，建立自信和條理",
        (Element::Water, false) => "需要情感支持，培養表達和溝通能力",
    };
    base.iter().chain([extra].iter()).map(|s| s.to_string()).collect()
}

fn age_stage_summaries(element: Element, strength: Strength) -> Vec<AgeStageSummary> {
    let strong = strength == Strength::Strong;
    let infant = match element {
        Element::Wood => "需要充足的自由探索空間，對新環境適應較快",
        Element::Fire => "情感表達豐富，需要溫暖的互動和回應",
        Element::Earth => "喜歡穩定的環境和規律，適應變化需要時間",
        Element::Metal => "對環境敏感，需要整潔有序的照護環境",
        Element::Water => "感受力強，需要安靜舒適的環境和情感連結",
    };
    let toddler = match element {
        Element::Wood => "創造力開始顯現，喜歡動手操作和探索",
        Element::Fire => "社交能力發展，喜歡與人互動和表演",
        Element::Earth => "責任感萌芽，喜歡幫助他人和參與家務",
        Element::Metal => "邏輯思維開始發展，喜歡分類和整理",
        Element::Water => "想像力豐富，喜歡聽故事和安靜的活動",
    };
    let preschool = match element {
        Element::Wood => "領導能力顯現，適合參與團體活動和創意遊戲",
        Element::Fire => "表達能力強，適合藝術創作和表演活動",
        Element::Earth => "穩定性增強，適合承擔小責任和幫助他人",
        Element::Metal => "分析能力發展，適合邏輯遊戲和規則性活動",
        Element::Water => "理解力深刻，適合閱讀和需要專注的活動",
    };

    [
        (
            "0-2歲",
            infant,
            if strong { "，個性較為明顯，需要耐心引導" } else { "，需要更多鼓勵和支持來建立自信" },
        ),
        (
            "3-4歲",
            toddler,
            if strong { "，自主性較強，需要適當的界限設定" } else { "，需要鼓勵嘗試新事物，培養自信心" },
        ),
        (
            "5-6歲",
            preschool,
            if strong { "，準備好迎接更多挑戰和學習機會" } else { "，需要循序漸進的引導和充分的準備時間" },
        ),
    ]
    .into_iter()
    .map(|(age, base, suffix)| AgeStageSummary {
        age: age.into(),
        summary: format!("{}{}", base, suffix),
    })
    .collect()
}

/// Canned 0-6 overview. Medium and weak share the not-strong wording.
pub fn overall_summary(profile: &ElementalProfile) -> OverallSummary {
    OverallSummary {
        personality_highlights: personality_highlights(profile.day_element, profile.strength),
        age_stages: age_stage_summaries(profile.day_element, profile.strength),
        group_life_advice: group_life_advice(profile),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStage {
    pub title: String,
    pub period: String,
    pub months: Vec<u32>,
    pub characteristics: Vec<String>,
    pub challenges: Vec<String>,
    pub care_advice: Vec<String>,
}

struct StageTemplate {
    title: &'static str,
    period: &'static str,
    months: &'static [u32],
    characteristics: [[&'static str; 4]; 2],
    challenges: [[&'static str; 4]; 2],
    care: [&'static str; 4],
}

const INFANT_STAGES: [StageTemplate; 6] = [
    StageTemplate {
        title: "0-1月",
        period: "新生兒期",
        months: &[0, 1],
        characteristics: [
            ["睡眠時間長，一天16-18小時", "需要頻繁餵養，2-3小時一次", "對聲音敏感，容易被驚醒", "喜歡被包裹的安全感"],
            ["新生兒反射明顯", "視力模糊但對光線敏感", "哭聲是主要溝通方式", "需要大量的肌膚接觸"],
        ],
        challenges: [
            ["日夜顛倒，睡眠週期混亂", "腸絞痛可能，傍晚哭鬧", "餵養困難，含乳不佳", "過度刺激敏感，容易哭鬧"],
            ["體重增長不穩定", "黃疸問題可能持續", "溫度調節能力差", "對環境變化適應困難"],
        ],
        care: ["建立規律作息", "提供安全包裹感", "溫柔的聲音安撫", "適當的肌膚接觸"],
    },
    StageTemplate {
        title: "2-3月",
        period: "適應期",
        months: &[2, 3],
        characteristics: [
            ["開始有社交微笑", "頭部控制能力增強", "對人臉有興趣", "哭聲開始有不同含義"],
            ["眼神開始追蹤物體", "開始發出咕咕聲", "手部動作更協調", "對音樂有反應"],
        ],
        challenges: [
            ["睡眠模式不穩定", "開始有分離焦慮", "容易受驚嚇", "需要更多互動刺激"],
            ["白天小睡時間不規律", "對聲音過度敏感", "餵奶時容易分心", "情緒變化快速"],
        ],
        care: ["增加互動遊戲", "提供視覺刺激", "建立睡前儀式", "回應寶寶的社交信號"],
    },
    StageTemplate {
        title: "4-5月",
        period: "互動期",
        months: &[4, 5],
        characteristics: [
            ["可以翻身", "開始抓握物品", "對鏡子感興趣", "笑聲更加豐富"],
            ["頭部可以穩定抬起", "開始伸手抓取玩具", "對顏色鮮豔的物品感興趣", "開始有規律的睡眠模式"],
        ],
        challenges: [
            ["開始長牙不適，流口水增加", "翻身後睡眠困擾", "對環境要求提高", "注意力短暫，容易分心"],
            ["手部協調能力發展中", "對新食物可能排斥", "睡眠時間開始減少", "需要更多感官刺激"],
        ],
        care: ["提供安全的探索環境", "適當的感官刺激", "支持翻身練習", "建立固定的日常節奏"],
    },
    StageTemplate {
        title: "6-7月",
        period: "探索期",
        months: &[6, 7],
        characteristics: [
            ["可以坐立", "開始添加副食品", "對陌生人有警戒", "喜歡敲打玩具"],
            ["可以不靠支撐坐著", "開始用手指抓取小物品", "認得熟悉的人", "喜歡把東西放進嘴裡探索"],
        ],
        challenges: [
            ["副食品適應期，可能過敏", "坐立不穩易跌倒", "陌生人焦慮明顯", "探索慾望增強但能力有限"],
            ["開始出現挑食行為", "爬行前的挫折感", "對玩具要求更高", "需要更多安全防護"],
        ],
        care: ["循序漸進添加副食品", "提供坐立支撐", "建立信任感", "豐富的語言輸入"],
    },
    StageTemplate {
        title: "8-9月",
        period: "爬行期",
        months: &[8, 9],
        characteristics: [
            ["開始爬行", "可以自己坐穩", "模仿大人動作", "對小物品感興趣"],
            ["可以扶著站立", "開始理解簡單的詞彙", "喜歡玩躲貓貓遊戲", "開始有分離焦慮"],
        ],
        challenges: [
            ["爬行期安全隱患增加", "分離焦慮加劇", "睡眠退化可能出現", "挫折忍受力低"],
            ["對小物品的危險探索", "模仿能力強但判斷力不足", "需要更多社交互動", "情緒表達更複雜"],
        ],
        care: ["確保爬行環境安全", "提供適當挑戰", "保持一致的照護者", "鼓勵探索但設定界限"],
    },
    StageTemplate {
        title: "10-12月",
        period: "學步期",
        months: &[10, 11, 12],
        characteristics: [
            ["開始站立行走", "理解簡單指令", "喜歡探索環境", "開始說單字"],
            ["可以獨立站立幾秒", "開始用手勢溝通", "喜歡模仿聲音", "對因果關係有初步理解"],
        ],
        challenges: [
            ["學步期跌倒風險高", "語言表達不足引起挫折", "獨立性與依賴性矛盾", "探索慾強但判斷力不足"],
            ["開始有自我意識但表達有限", "對規則的理解能力有限", "社交技能發展中", "情緒調節能力待發展"],
        ],
        care: ["提供學步支持", "豐富語言環境", "平衡獨立與協助", "建立安全探索區域"],
    },
];

fn element_traits(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => ["成長發育較快，身高體重增長明顯", "對自然環境敏感，喜歡戶外活動", "好奇心強，喜歡探索新事物"],
        Element::Fire => ["情緒表達豐富，笑聲爽朗", "活動力較強，精力充沛", "對光線和色彩敏感，喜歡明亮環境"],
        Element::Earth => ["性情較為穩定，不易哭鬧", "適應力強，容易建立規律作息", "喜歡穩定的環境和熟悉的照護者"],
        Element::Metal => ["作息規律性佳，容易養成習慣", "對秩序敏感，喜歡整潔環境", "反應敏銳，學習能力強"],
        Element::Water => ["直覺敏銳，對情緒變化敏感", "情感豐富，需要更多安撫", "睡眠較深，但容易受環境影響"],
    }
}

fn element_challenges(element: Element) -> [&'static str; 3] {
    match element {
        Element::Wood => ["成長速度不一致可能帶來生長痛", "精力旺盛難以安靜", "對束縛感到不適"],
        Element::Fire => ["情緒起伏較大，哭鬧激烈", "容易過度刺激影響睡眠", "對溫度變化敏感"],
        Element::Earth => ["變化適應需要更長時間", "可能出現固執行為", "食慾不穩定傾向"],
        Element::Metal => ["對環境變化非常敏感", "完美主義造成焦慮", "對噪音不耐受"],
        Element::Water => ["情緒感受深刻，需要更多安撫", "睡眠容易受干擾", "對照護者情緒敏感"],
    }
}

fn element_care(element: Element) -> [&'static str; 4] {
    match element {
        Element::Wood => ["提供充足的自然光線和綠色植物", "增加戶外活動時間", "使用天然材質的玩具", "鼓勵自由探索但設定安全界限"],
        Element::Fire => ["保持環境溫暖但通風良好", "提供豐富的色彩和視覺刺激", "使用柔和的燈光避免過度刺激", "建立規律的活動和休息時間"],
        Element::Earth => ["維持穩定的環境和作息時間", "給予充分的安全感和擁抱", "逐步引入新事物避免突然變化", "提供質地豐富的觸覺體驗"],
        Element::Metal => ["保持環境整潔有序", "建立清晰的日常規律和儀式感", "使用柔軟的音樂和聲音", "提供精緻的感官體驗"],
        Element::Water => ["提供安靜舒適的環境", "注重情感連結和溫柔互動", "使用流動的音樂或白噪音", "保持適當的濕度和溫度"],
    }
}

/// Period name (新生兒期 …) for a stage title such as `0-1月`
pub fn infant_period(title: &str) -> Option<&'static str> {
    INFANT_STAGES
        .iter()
        .find(|stage| stage.title == title.trim())
        .map(|stage| stage.period)
}

/// First-year guide in six stages. Phrasing varies with `seed`; the same
/// seed always yields the same table.
pub fn monthly_table(profile: &ElementalProfile, seed: u64) -> Vec<MonthlyStage> {
    let mut rng = StdRng::seed_from_u64(seed);
    let element = profile.day_element;
    let care_extra = if profile.is_favorable(element) { 3 } else { 2 };
    let traits = element_traits(element);
    let extra_challenges = element_challenges(element);
    let extra_care = element_care(element);

    INFANT_STAGES
        .iter()
        .map(|stage| {
            let characteristics = stage.characteristics[rng.gen_range(0..2)]
                .iter()
                .chain(traits.iter().take(rng.gen_range(2..=3)));
            let challenges = stage.challenges[rng.gen_range(0..2)]
                .iter()
                .chain(extra_challenges.iter().take(rng.gen_range(1..=2)));
            let care = stage
                .care
                .iter()
                .chain(extra_care.iter().take(care_extra));

            MonthlyStage {
                title: stage.title.into(),
                period: stage.period.into(),
                months: stage.months.to_vec(),
                characteristics: characteristics.map(|s| s.to_string()).collect(),
                challenges: challenges.map(|s| s.to_string()).collect(),
                care_advice: care.map(|s| s.to_string()).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::cycle::{Pillar, Stem};
    use crate::pillar::{calculate, BirthMoment};
    use crate::scoring::{favorable_elements, profile, ElementTally};

    fn make_profile(day_element: Element, strength: Strength) -> ElementalProfile {
        let (favorable, unfavorable) = favorable_elements(day_element, strength);
        ElementalProfile {
            day_element,
            strength,
            day_share: 20.0,
            favorable,
            unfavorable,
            tally: ElementTally::default(),
            percentages: ElementTally::default(),
        }
    }

    fn make_chart() -> Chart {
        let birth = BirthMoment::new(1990, 1, 1, 8).unwrap();
        Chart::compute(birth, &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_overall_analysis_mentions_profile_and_na_yin() {
        let chart = make_chart();
        let text = overall_analysis(&chart);

        assert!(text.starts_with("這位寶寶八字日主為水，五行中。"));
        assert!(text.contains("有利五行為金、木，不利五行為土、火"));
        // 庚午 路旁土, 壬辰 長流水
        assert!(text.contains("年柱納音為路旁土"));
        assert!(text.contains("日柱納音為長流水"));
        assert!(text.contains("水主智"));
    }

    #[test]
    fn test_personality_tags_within_bounds() {
        let chart = calculate(1990, 1, 1, 8).unwrap();
        let p = profile(&chart).unwrap();
        let personality = personality(&chart, &p);

        // 辰辰 gives two earth branches
        assert!(personality.tags.contains(&"安全導向".to_string()));
        assert!(personality.tags.len() >= MIN_TAGS && personality.tags.len() <= MAX_TAGS);
        assert!(personality.summary.contains("適應靈活"));
    }

    #[test]
    fn test_personality_pads_to_five_tags() {
        let filler = Pillar::new(Stem::Jia, Branch::Yin);
        let pillars = FourPillars::new(filler, filler, filler, filler);
        let personality = personality(&pillars, &make_profile(Element::Wood, Strength::Strong));

        assert_eq!(personality.tags.len(), 5);
        assert_eq!(personality.tags[3], "自主性強");
        assert_eq!(personality.tags[4], "溫和親近");
        assert_eq!(personality.details.len(), 4);
    }

    #[test]
    fn test_growth_phases_follow_strength() {
        let strong = growth_phases(&make_profile(Element::Fire, Strength::Strong));
        let medium = growth_phases(&make_profile(Element::Fire, Strength::Medium));

        assert_eq!(strong.len(), 3);
        assert_eq!(strong[0].age, "0-3歲");
        assert!(strong[0].description.contains("火性較強"));
        assert!(medium[0].description.contains("火性較弱"));
        assert!(medium[2].description.starts_with("火性寶寶在小學階段"));
    }

    #[test]
    fn test_group_life_advice_adds_favorable_activities() {
        let advice = group_life_advice(&make_profile(Element::Water, Strength::Weak));
        // weak water: favorable 金 木
        assert_eq!(advice.len(), 6);
        assert!(advice.contains(&"適合參與戶外和自然相關的團體活動".to_string()));
        assert!(advice.contains(&"適合參與有組織和競爭性的團體活動".to_string()));
    }

    #[test]
    fn test_monthly_table_same_seed_same_output() {
        let p = make_profile(Element::Metal, Strength::Medium);
        assert_eq!(monthly_table(&p, 42), monthly_table(&p, 42));
    }

    #[test]
    fn test_monthly_table_seed_varies_phrasing() {
        let p = make_profile(Element::Metal, Strength::Medium);
        let first = monthly_table(&p, 0);
        let varied = (1..64).any(|seed| monthly_table(&p, seed) != first);
        assert!(varied);
    }

    #[test]
    fn test_monthly_table_shape() {
        let p = make_profile(Element::Earth, Strength::Strong);
        let table = monthly_table(&p, 7);

        assert_eq!(table.len(), 6);
        assert_eq!(table[5].months, vec![10, 11, 12]);
        for stage in &table {
            assert!((6..=7).contains(&stage.characteristics.len()));
            assert!((5..=6).contains(&stage.challenges.len()));
            // strong earth: earth is not favorable, so two extra care items
            assert_eq!(stage.care_advice.len(), 6);
        }
    }

    #[test]
    fn test_monthly_table_extra_care_when_day_element_favorable() {
        let mut p = make_profile(Element::Wood, Strength::Weak);
        p.favorable = [Element::Wood, Element::Fire];
        let table = monthly_table(&p, 1);
        assert!(table.iter().all(|s| s.care_advice.len() == 7));
    }

    #[test]
    fn test_stage_traits_per_element() {
        let expected = [
            (Element::Wood, "活潑好動", "具有開拓精神"),
            (Element::Fire, "情緒變化快", "熱情積極"),
            (Element::Earth, "性格溫和穩定", "穩重可靠"),
            (Element::Metal, "反應敏銳", "原則性強"),
            (Element::Water, "聰明靈活", "思維靈活"),
        ];
        for (element, infant, middle) in expected {
            let stages = stage_traits(&make_profile(element, Strength::Medium));
            assert_eq!(stages.len(), 4);
            assert_eq!(stages[0].age, "0-2歲");
            assert_eq!(stages[3].age, "9-10歲");
            assert!(stages.iter().all(|s| s.traits.len() == 5));
            assert!(stages[0].traits[4].starts_with(infant));
            assert!(stages[3].traits[4].starts_with(middle));
        }
    }

    #[test]
    fn test_stage_traits_ignore_strength() {
        for element in Element::ALL {
            let strong = stage_traits(&make_profile(element, Strength::Strong));
            let weak = stage_traits(&make_profile(element, Strength::Weak));
            assert_eq!(strong, weak);
        }
    }

    #[test]
    fn test_topic_advice_per_element() {
        let expected = [
            (Element::Wood, "體驗式學習", "肝膽"),
            (Element::Fire, "互動式學習", "心血管"),
            (Element::Earth, "循序漸進", "脾胃"),
            (Element::Metal, "邏輯學習", "肺部"),
            (Element::Water, "靈活學習", "腎臟"),
        ];
        for (element, learning, organ) in expected {
            let advice = topic_advice(&make_profile(element, Strength::Weak));
            assert!(advice.learning_style[0].starts_with(learning));
            assert_eq!(advice.communication.len(), 3);
            assert_eq!(advice.interests.len(), 3);
            assert!(advice.constitution.contains(organ));
            assert!(advice.diet.starts_with("飲食建議"));
            assert!(advice.exercise.starts_with("運動建議"));
        }
    }

    #[test]
    fn test_topic_advice_same_for_every_strength() {
        let strong = topic_advice(&make_profile(Element::Metal, Strength::Strong));
        let medium = topic_advice(&make_profile(Element::Metal, Strength::Medium));
        assert_eq!(strong, medium);
        assert!(strong.interests[0].contains("數學"));
    }

    #[test]
    fn test_overall_summary_strong() {
        let summary = overall_summary(&make_profile(Element::Wood, Strength::Strong));

        assert_eq!(summary.personality_highlights.len(), 5);
        assert_eq!(summary.personality_highlights[4], "個性較為堅持，需要引導學習妥協");
        let ages: Vec<&str> = summary.age_stages.iter().map(|a| a.age.as_str()).collect();
        assert_eq!(ages, vec!["0-2歲", "3-4歲", "5-6歲"]);
        assert_eq!(
            summary.age_stages[0].summary,
            "需要充足的自由探索空間，對新環境適應較快，個性較為明顯，需要耐心引導"
        );
        assert!(summary.age_stages[2].summary.ends_with("準備好迎接更多挑戰和學習機會"));
    }

    #[test]
    fn test_overall_summary_medium_uses_not_strong_wording() {
        for element in Element::ALL {
            let medium = overall_summary(&make_profile(element, Strength::Medium));
            let weak = overall_summary(&make_profile(element, Strength::Weak));
            assert_eq!(medium.personality_highlights, weak.personality_highlights);
            assert_eq!(medium.age_stages, weak.age_stages);
        }
        let water = overall_summary(&make_profile(Element::Water, Strength::Medium));
        assert_eq!(water.personality_highlights[4], "需要情感支持，培養表達和溝通能力");
        assert!(water.age_stages[1].summary.ends_with("需要鼓勵嘗試新事物，培養自信心"));
    }

    #[test]
    fn test_overall_summary_includes_group_life_advice() {
        let p = make_profile(Element::Earth, Strength::Weak);
        assert_eq!(overall_summary(&p).group_life_advice, group_life_advice(&p));
    }

    #[test]
    fn test_infant_period_lookup() {
        assert_eq!(infant_period("0-1月"), Some("新生兒期"));
        assert_eq!(infant_period(" 10-12月 "), Some("學步期"));
        assert_eq!(infant_period("13-14月"), None);
    }
}
