use serde::{Deserialize, Serialize};

/// Lab tests the chat layer knows about.
///
/// Declaration order is the canonical order: value extraction tries tests in
/// this order and result summaries list them in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabTest {
    Glucose,
    Bun,
    Creatinine,
    Egfr,
    Alt,
    Ast,
    Wbc,
    Rbc,
    Hemoglobin,
    Hematocrit,
    Platelets,
    Cholesterol,
    Hdl,
    Ldl,
    Triglycerides,
    A1c,
    Tsh,
    #[serde(rename = "vitamin d")]
    VitaminD,
    Iron,
}

impl LabTest {
    pub const ALL: [LabTest; 19] = [
        LabTest::Glucose,
        LabTest::Bun,
        LabTest::Creatinine,
        LabTest::Egfr,
        LabTest::Alt,
        LabTest::Ast,
        LabTest::Wbc,
        LabTest::Rbc,
        LabTest::Hemoglobin,
        LabTest::Hematocrit,
        LabTest::Platelets,
        LabTest::Cholesterol,
        LabTest::Hdl,
        LabTest::Ldl,
        LabTest::Triglycerides,
        LabTest::A1c,
        LabTest::Tsh,
        LabTest::VitaminD,
        LabTest::Iron,
    ];

    /// Canonical lower-case key ("glucose", "vitamin d", ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Glucose => "glucose",
            Self::Bun => "bun",
            Self::Creatinine => "creatinine",
            Self::Egfr => "egfr",
            Self::Alt => "alt",
            Self::Ast => "ast",
            Self::Wbc => "wbc",
            Self::Rbc => "rbc",
            Self::Hemoglobin => "hemoglobin",
            Self::Hematocrit => "hematocrit",
            Self::Platelets => "platelets",
            Self::Cholesterol => "cholesterol",
            Self::Hdl => "hdl",
            Self::Ldl => "ldl",
            Self::Triglycerides => "triglycerides",
            Self::A1c => "a1c",
            Self::Tsh => "tsh",
            Self::VitaminD => "vitamin d",
            Self::Iron => "iron",
        }
    }

    /// Look up a test by canonical key, ignoring case.
    pub fn from_key(key: &str) -> Option<Self> {
        let lower = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.key() == lower)
    }

    pub fn profile(&self) -> &'static TestProfile {
        &PROFILES[*self as usize]
    }

    pub fn reference(&self) -> Option<&'static ReferenceTable> {
        self.profile().reference.as_ref()
    }
}

impl std::fmt::Display for LabTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Named interval of a test's numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "high_1")]
    High1,
    #[serde(rename = "high_2")]
    High2,
    #[serde(rename = "high_3")]
    High3,
    #[serde(rename = "high_4")]
    High4,
}

impl Band {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::High1 => "high_1",
            Self::High2 => "high_2",
            Self::High3 => "high_3",
            Self::High4 => "high_4",
        }
    }
}

/// Upper edge of a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// `value < x`
    Below(f64),
    /// `value <= x`
    AtMost(f64),
    Unbounded,
}

impl Bound {
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            Self::Below(x) => value < x,
            Self::AtMost(x) => value <= x,
            Self::Unbounded => !value.is_nan(),
        }
    }
}

/// One band of a reference table. `answer` may contain `{value}`.
#[derive(Debug)]
pub struct BandRule {
    pub band: Band,
    pub upper: Bound,
    pub summary: &'static str,
    pub answer: &'static str,
}

impl BandRule {
    pub fn render_answer(&self, value: f64) -> String {
        self.answer.replace("{value}", &value.to_string())
    }
}

/// Reference range text plus ordered bands, lowest first.
#[derive(Debug)]
pub struct ReferenceTable {
    pub range: &'static str,
    pub bands: &'static [BandRule],
}

impl ReferenceTable {
    /// First band whose upper edge admits `value`. The last band of every
    /// table is unbounded, so only NaN can fall through.
    pub fn classify(&self, value: f64) -> Option<&'static BandRule> {
        self.bands.iter().find(|rule| rule.upper.admits(value))
    }
}

/// Everything the chat layer knows about one test.
#[derive(Debug)]
pub struct TestProfile {
    pub test: LabTest,
    /// Regex fragments naming the test in analysis text, tried in order.
    /// Each is completed as `\b(?:fragment)\s+is\s+(<number>)`.
    pub value_patterns: &'static [&'static str],
    /// Regex fragments that count as mentioning the test in a question.
    pub question_aliases: &'static [&'static str],
    pub reference: Option<ReferenceTable>,
    pub description: &'static str,
}

macro_rules! band {
    ($band:ident, $upper:expr, $summary:literal, $answer:literal) => {
        BandRule {
            band: Band::$band,
            upper: $upper,
            summary: $summary,
            answer: $answer,
        }
    };
}

/// Indexed by `LabTest as usize`.
static PROFILES: [TestProfile; 19] = [
    TestProfile {
        test: LabTest::Glucose,
        value_patterns: &[r"glucose", r"blood\s+sugar"],
        question_aliases: &[r"glucose", r"blood\s+sugar", r"sugar"],
        reference: Some(ReferenceTable {
            range: "70-99 mg/dL (fasting)",
            bands: &[
                band!(Low, Bound::Below(70.0),
                    "below 70 mg/dL - hypoglycemia (low blood sugar)",
                    "Your blood glucose level of {value} mg/dL is below the normal range (70-99 mg/dL when fasting). This is considered hypoglycemia (low blood sugar). You should consult with your healthcare provider as this may require immediate attention."),
                band!(Normal, Bound::Below(100.0),
                    "70-99 mg/dL - normal fasting glucose",
                    "Your blood glucose level of {value} mg/dL is within the normal fasting range (70-99 mg/dL). This suggests your blood sugar is well-controlled."),
                band!(High1, Bound::Below(126.0),
                    "100-125 mg/dL - prediabetes (when fasting)",
                    "Your blood glucose level of {value} mg/dL is in the prediabetic range (100-125 mg/dL when fasting). This suggests you may have prediabetes, a condition where blood sugar is higher than normal but not high enough to be diagnosed as diabetes. I recommend discussing this with your healthcare provider."),
                band!(High2, Bound::Unbounded,
                    "126 mg/dL or higher - may indicate diabetes (when fasting)",
                    "Your blood glucose level of {value} mg/dL is above the normal range and may indicate diabetes (≥126 mg/dL when fasting). I recommend consulting with your healthcare provider for proper diagnosis and treatment."),
            ],
        }),
        description: "Glucose is the main sugar in your blood and your body's primary source of energy. A fasting glucose test is used to screen for diabetes and prediabetes. Normal fasting glucose is typically 70-99 mg/dL; 100-125 mg/dL suggests prediabetes and 126 mg/dL or higher may indicate diabetes.",
    },
    TestProfile {
        test: LabTest::Bun,
        value_patterns: &[r"bun", r"blood\s+urea\s+nitrogen"],
        question_aliases: &[r"bun", r"blood\s+urea\s+nitrogen"],
        reference: Some(ReferenceTable {
            range: "7-20 mg/dL",
            bands: &[
                band!(Low, Bound::Below(7.0),
                    "below 7 mg/dL - may indicate liver disease, malnutrition, or overhydration",
                    "Your BUN (Blood Urea Nitrogen) level of {value} mg/dL is below the normal range (7-20 mg/dL). Low BUN can be associated with liver disease, malnutrition, or overhydration. Please consult with your healthcare provider for proper interpretation."),
                band!(Normal, Bound::AtMost(20.0),
                    "7-20 mg/dL - normal kidney function",
                    "Your BUN (Blood Urea Nitrogen) level of {value} mg/dL is within the normal range (7-20 mg/dL). BUN is a measure of kidney function and protein metabolism. A normal level suggests your kidneys are filtering waste products effectively."),
                band!(High, Bound::Unbounded,
                    "above 20 mg/dL - may indicate reduced kidney function, dehydration, or high protein diet",
                    "Your BUN (Blood Urea Nitrogen) level of {value} mg/dL is above the normal range (7-20 mg/dL). Elevated BUN can indicate reduced kidney function, dehydration, high protein diet, or certain medications. I recommend discussing this with your healthcare provider."),
            ],
        }),
        description: "BUN (Blood Urea Nitrogen) is a blood test that measures the amount of urea nitrogen in your blood. Urea is a waste product formed in the liver when protein is broken down. BUN is primarily used to evaluate kidney function. The normal range for adults is typically 7-20 mg/dL. If you have your specific BUN value, I can provide a more personalized interpretation.",
    },
    TestProfile {
        test: LabTest::Creatinine,
        value_patterns: &[r"creatinine"],
        question_aliases: &[r"creatinine"],
        reference: Some(ReferenceTable {
            range: "0.7-1.3 mg/dL (men), 0.6-1.1 mg/dL (women)",
            bands: &[
                band!(Low, Bound::Below(0.6),
                    "below range - may indicate decreased muscle mass",
                    "Your creatinine level of {value} mg/dL is below the typical range. Low creatinine can be associated with decreased muscle mass or sometimes liver disease. Please consult with your healthcare provider for proper interpretation."),
                band!(Normal, Bound::AtMost(1.3),
                    "within range - normal kidney function",
                    "Your creatinine level of {value} mg/dL is within the normal range (0.6-1.3 mg/dL). Creatinine is a waste product from muscle metabolism that's filtered by your kidneys. A normal level suggests your kidneys are functioning properly."),
                band!(High, Bound::Unbounded,
                    "above range - may indicate kidney problems",
                    "Your creatinine level of {value} mg/dL is above the normal range. Elevated creatinine can indicate kidney problems, as it suggests your kidneys aren't filtering waste effectively. I recommend discussing this with your healthcare provider."),
            ],
        }),
        description: "Creatinine is a waste product from the normal breakdown of muscle tissue. As creatinine is produced, it's filtered through the kidneys and excreted in urine. Measuring creatinine is a useful way to evaluate kidney function. Normal range is typically 0.7-1.3 mg/dL for men and 0.6-1.1 mg/dL for women.",
    },
    TestProfile {
        test: LabTest::Egfr,
        value_patterns: &[r"egfr", r"estimated\s+glomerular\s+filtration\s+rate"],
        question_aliases: &[r"egfr", r"glomerular\s+filtration\s+rate"],
        reference: None,
        description: "eGFR (estimated Glomerular Filtration Rate) is a calculation based on your creatinine level, age, body size, and gender that determines how well your kidneys are filtering. Normal eGFR is 90 or higher, with lower values indicating decreased kidney function.",
    },
    TestProfile {
        test: LabTest::Alt,
        value_patterns: &[r"alt", r"alanine\s+aminotransferase"],
        question_aliases: &[r"alt", r"alanine\s+aminotransferase"],
        reference: None,
        description: "ALT (Alanine Aminotransferase) is an enzyme found primarily in the liver. Elevated levels may indicate liver damage or disease. Normal range is typically 7-56 units/L for men and 7-45 units/L for women.",
    },
    TestProfile {
        test: LabTest::Ast,
        value_patterns: &[r"ast", r"aspartate\s+aminotransferase"],
        question_aliases: &[r"ast", r"aspartate\s+aminotransferase"],
        reference: None,
        description: "AST (Aspartate Aminotransferase) is an enzyme found in the liver, heart, and muscles. Elevated levels may indicate damage to these organs. Normal range is typically 8-48 units/L for men and 7-42 units/L for women.",
    },
    TestProfile {
        test: LabTest::Wbc,
        value_patterns: &[r"wbc", r"white\s+blood\s+cells?(?:\s+count)?"],
        question_aliases: &[r"wbc", r"white\s+blood\s+cells?(?:\s+count)?", r"white\s+cells?"],
        reference: None,
        description: "WBC (White Blood Cell) count measures the number of white blood cells in your blood, which fight infection. Normal range is typically 4,500-11,000 cells/mcL. High levels may indicate infection or inflammation, while low levels may suggest bone marrow problems or certain medications.",
    },
    TestProfile {
        test: LabTest::Rbc,
        value_patterns: &[r"rbc", r"red\s+blood\s+cells?(?:\s+count)?"],
        question_aliases: &[r"rbc", r"red\s+blood\s+cells?(?:\s+count)?", r"red\s+cells?"],
        reference: None,
        description: "RBC (Red Blood Cell) count measures the number of red blood cells in your blood, which carry oxygen. Normal range is typically 4.5-5.9 million cells/mcL for men and 4.1-5.1 million cells/mcL for women. Abnormal levels may indicate anemia or other conditions.",
    },
    TestProfile {
        test: LabTest::Hemoglobin,
        value_patterns: &[r"h(?:emo)?globin", r"hgb"],
        question_aliases: &[r"hemoglobin", r"haemoglobin", r"hgb"],
        reference: None,
        description: "Hemoglobin is the protein in red blood cells that carries oxygen. Normal range is typically 13.5-17.5 g/dL for men and 12.0-15.5 g/dL for women. Low levels may indicate anemia, while high levels may suggest other conditions.",
    },
    TestProfile {
        test: LabTest::Hematocrit,
        value_patterns: &[r"hematocrit", r"hct"],
        question_aliases: &[r"hematocrit", r"haematocrit", r"hct"],
        reference: None,
        description: "Hematocrit is the percentage of your blood that is made up of red blood cells. Normal range is typically 38.8-50% for men and 34.9-44.5% for women. Abnormal levels may indicate dehydration, anemia, or other conditions.",
    },
    TestProfile {
        test: LabTest::Platelets,
        value_patterns: &[r"platelets(?:\s+count)?"],
        question_aliases: &[r"platelets?(?:\s+count)?"],
        reference: None,
        description: "Platelets are cell fragments that help your blood clot. Normal range is typically 150,000-450,000 platelets/mcL. Low levels may increase bleeding risk, while high levels may increase clotting risk.",
    },
    TestProfile {
        test: LabTest::Cholesterol,
        value_patterns: &[r"cholesterol", r"total\s+cholesterol"],
        question_aliases: &[r"(?:total\s+)?cholesterol"],
        reference: Some(ReferenceTable {
            range: "below 200 mg/dL",
            bands: &[
                band!(Normal, Bound::Below(200.0),
                    "below 200 mg/dL - desirable",
                    "Your total cholesterol level of {value} mg/dL is within the desirable range (below 200 mg/dL). This is good for your heart health."),
                band!(High1, Bound::Below(240.0),
                    "200-239 mg/dL - borderline high",
                    "Your total cholesterol level of {value} mg/dL is borderline high (200-239 mg/dL). Consider lifestyle changes like diet and exercise to lower it."),
                band!(High2, Bound::Unbounded,
                    "240 mg/dL or higher - high",
                    "Your total cholesterol level of {value} mg/dL is high (240 mg/dL or higher). This increases your risk for heart disease and stroke. I recommend discussing treatment options with your healthcare provider."),
            ],
        }),
        description: "Cholesterol is a fatty substance in your blood. Total cholesterol should ideally be below 200 mg/dL. High levels may increase risk of heart disease.",
    },
    TestProfile {
        test: LabTest::Hdl,
        value_patterns: &[r"hdl", r"high\s+density\s+lipoprotein"],
        question_aliases: &[
            r"hdl(?:\s+cholesterol)?",
            r"high[\s-]+density\s+lipoprotein",
            r"good\s+cholesterol",
        ],
        reference: Some(ReferenceTable {
            range: "above 40 mg/dL (men), above 50 mg/dL (women)",
            bands: &[
                band!(Low, Bound::Below(40.0),
                    "below range - increased heart disease risk",
                    "Your HDL cholesterol level of {value} mg/dL is below the recommended range (above 40 mg/dL for men, above 50 mg/dL for women). Low HDL is associated with increased heart disease risk. I recommend discussing this with your healthcare provider."),
                band!(Normal, Bound::Below(60.0),
                    "within range - acceptable",
                    "Your HDL cholesterol level of {value} mg/dL is within the acceptable range. HDL helps remove other forms of cholesterol from your bloodstream."),
                band!(High, Bound::Unbounded,
                    "60 mg/dL or higher - considered protective against heart disease",
                    "Your HDL cholesterol level of {value} mg/dL is 60 mg/dL or higher, which is considered protective against heart disease."),
            ],
        }),
        description: "HDL (High-Density Lipoprotein) is often called 'good cholesterol' as it helps remove other forms of cholesterol from your bloodstream. Higher levels (>60 mg/dL) are better and may protect against heart disease.",
    },
    TestProfile {
        test: LabTest::Ldl,
        value_patterns: &[r"ldl", r"low\s+density\s+lipoprotein"],
        question_aliases: &[
            r"ldl(?:\s+cholesterol)?",
            r"low[\s-]+density\s+lipoprotein",
            r"bad\s+cholesterol",
        ],
        reference: Some(ReferenceTable {
            range: "below 100 mg/dL",
            bands: &[
                band!(Normal, Bound::Below(100.0),
                    "below 100 mg/dL - optimal",
                    "Your LDL cholesterol level of {value} mg/dL is in the optimal range (below 100 mg/dL)."),
                band!(High1, Bound::Below(130.0),
                    "100-129 mg/dL - near optimal",
                    "Your LDL cholesterol level of {value} mg/dL is near optimal (100-129 mg/dL)."),
                band!(High2, Bound::Below(160.0),
                    "130-159 mg/dL - borderline high",
                    "Your LDL cholesterol level of {value} mg/dL is borderline high (130-159 mg/dL). Consider lifestyle changes like diet and exercise to lower it."),
                band!(High3, Bound::Below(190.0),
                    "160-189 mg/dL - high",
                    "Your LDL cholesterol level of {value} mg/dL is high (160-189 mg/dL). This increases your risk for heart disease. I recommend discussing this with your healthcare provider."),
                band!(High4, Bound::Unbounded,
                    "190 mg/dL or higher - very high",
                    "Your LDL cholesterol level of {value} mg/dL is very high (190 mg/dL or higher). This significantly increases your risk for heart disease. I recommend discussing treatment options with your healthcare provider."),
            ],
        }),
        description: "LDL (Low-Density Lipoprotein) is often called 'bad cholesterol' as it can build up in your arteries. Lower levels (<100 mg/dL) are better to reduce heart disease risk.",
    },
    TestProfile {
        test: LabTest::Triglycerides,
        value_patterns: &[r"triglycerides"],
        question_aliases: &[r"triglycerides?"],
        reference: Some(ReferenceTable {
            range: "below 150 mg/dL",
            bands: &[
                band!(Normal, Bound::Below(150.0),
                    "below 150 mg/dL - normal",
                    "Your triglyceride level of {value} mg/dL is within the normal range (below 150 mg/dL)."),
                band!(High1, Bound::Below(200.0),
                    "150-199 mg/dL - borderline high",
                    "Your triglyceride level of {value} mg/dL is borderline high (150-199 mg/dL). Diet, exercise and limiting alcohol can help lower it."),
                band!(High2, Bound::Below(500.0),
                    "200-499 mg/dL - high",
                    "Your triglyceride level of {value} mg/dL is high (200-499 mg/dL). High triglycerides may increase your risk of heart disease. I recommend discussing this with your healthcare provider."),
                band!(High3, Bound::Unbounded,
                    "500 mg/dL or higher - very high",
                    "Your triglyceride level of {value} mg/dL is very high (500 mg/dL or higher). I recommend consulting with your healthcare provider promptly."),
            ],
        }),
        description: "Triglycerides are a type of fat in your blood. Normal levels are <150 mg/dL. High levels may increase risk of heart disease and may be associated with diabetes or metabolic syndrome.",
    },
    TestProfile {
        test: LabTest::A1c,
        value_patterns: &[r"a1c", r"hba1c", r"hemoglobin\s+a1c"],
        question_aliases: &[r"a1c", r"hba1c", r"h(?:a)?emoglobin\s+a1c", r"glycated\s+h(?:a)?emoglobin"],
        reference: None,
        description: "HbA1c or A1C measures your average blood sugar level over the past 2-3 months. Normal is <5.7%, prediabetes is 5.7-6.4%, and diabetes is ≥6.5%.",
    },
    TestProfile {
        test: LabTest::Tsh,
        value_patterns: &[r"tsh", r"thyroid\s+stimulating\s+hormone"],
        question_aliases: &[r"tsh", r"thyroid[\s-]+stimulating\s+hormone", r"thyroid"],
        reference: None,
        description: "TSH (Thyroid Stimulating Hormone) is produced by the pituitary gland and regulates thyroid function. Normal range is typically 0.4-4.0 mIU/L. Abnormal levels may indicate thyroid disorders.",
    },
    TestProfile {
        test: LabTest::VitaminD,
        value_patterns: &[r"vitamin\s+d", r"25-hydroxyvitamin\s+d"],
        question_aliases: &[r"vitamin\s+d", r"25-hydroxyvitamin\s+d"],
        reference: None,
        description: "Vitamin D is important for bone health and immune function. Normal levels are typically 20-50 ng/mL. Low levels may lead to bone problems and are associated with various health conditions.",
    },
    TestProfile {
        test: LabTest::Iron,
        value_patterns: &[r"iron"],
        question_aliases: &[r"iron"],
        reference: None,
        description: "Iron is essential for red blood cell production. Normal range varies by gender, with men typically having 65-175 μg/dL and women 50-170 μg/dL. Abnormal levels may indicate anemia or iron overload.",
    },
];
