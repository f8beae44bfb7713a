use serde::{Deserialize, Serialize};

use crate::types::errors::PaperError;

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Converts millimetres to inches.
pub fn mm_to_inch(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

/// A named paper size, dimensions in millimetres (portrait).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperStock {
    pub key: String,
    pub description: String,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PaperStock {
    fn new(key: &str, description: &str, width_mm: f64, height_mm: f64) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            width_mm,
            height_mm,
        }
    }

    /// Looks up a stock by key, ignoring ASCII case.
    pub fn lookup(key: &str) -> Result<PaperStock, PaperError> {
        let wanted = key.trim();
        catalogue()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PaperError::UnknownStock(key.to_string()))
    }

    pub fn a4() -> PaperStock {
        iso_series('a', 841, 1189, 4)
    }

    pub fn letter() -> PaperStock {
        Self::new("letter", "Letter 8.5 x 11 inches, 215.9 x 279.4 mm", 215.9, 279.4)
    }
}

/// ISO 216 sizes: each step halves the long side of the previous size,
/// rounding down to whole millimetres.
fn iso_series(prefix: char, w0: u32, h0: u32, n: u32) -> PaperStock {
    let (mut w, mut h) = (w0, h0);
    for _ in 0..n {
        let next_w = h / 2;
        h = w;
        w = next_w;
    }
    let upper = prefix.to_ascii_uppercase();
    PaperStock::new(
        &format!("{}{}", prefix, n),
        &format!("{}{} {} x {} mm", upper, n, w, h),
        f64::from(w),
        f64::from(h),
    )
}

/// Every paper stock known to the printer, A series first.
pub fn catalogue() -> Vec<PaperStock> {
    let mut stocks: Vec<PaperStock> = (0..=10).map(|n| iso_series('a', 841, 1189, n)).collect();
    stocks.extend((0..=10).map(|n| iso_series('b', 1000, 1414, n)));
    stocks.extend([
        PaperStock::new("c5e", "C5E 163 x 229 mm", 163.0, 229.0),
        PaperStock::new("comm10e", "Comm10E 105 x 241 mm, U.S. Common 10 Envelope", 105.0, 241.0),
        PaperStock::new("dle", "DLE 110 x 220 mm", 110.0, 220.0),
        PaperStock::new("executive", "Executive 7.5 x 10 inches, 190.5 x 254 mm", 190.5, 254.0),
        PaperStock::new("folio", "Folio 210 x 330 mm", 210.0, 330.0),
        PaperStock::new("ledger", "Ledger 431.8 x 279.4 mm", 431.8, 279.4),
        PaperStock::new("legal", "Legal 8.5 x 14 inches, 215.9 x 355.6 mm", 215.9, 355.6),
        PaperStock::letter(),
        PaperStock::new("tabloid", "Tabloid 279.4 x 431.8 mm", 279.4, 431.8),
    ]);
    stocks
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Resolved page margins in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    pub fn uniform(mm: f64) -> Self {
        Self { top: mm, bottom: mm, left: mm, right: mm }
    }

    /// Margins in inches, ordered top, bottom, left, right.
    pub fn to_inches(self) -> [f64; 4] {
        [
            mm_to_inch(self.top),
            mm_to_inch(self.bottom),
            mm_to_inch(self.left),
            mm_to_inch(self.right),
        ]
    }
}

/// Partially specified margins.
///
/// A specific side wins over `vert` (top/bottom) or `horiz` (left/right),
/// which win over `all`. Sides left unset resolve to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginOverrides {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub all: Option<f64>,
    pub horiz: Option<f64>,
    pub vert: Option<f64>,
}

impl MarginOverrides {
    pub fn resolve(&self) -> Margins {
        let vertical = |side: Option<f64>| side.or(self.vert).or(self.all).unwrap_or(0.0);
        let horizontal = |side: Option<f64>| side.or(self.horiz).or(self.all).unwrap_or(0.0);
        Margins {
            top: vertical(self.top),
            bottom: vertical(self.bottom),
            left: horizontal(self.left),
            right: horizontal(self.right),
        }
    }
}

/// Settings handed to a print operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    pub stock: PaperStock,
    pub orientation: Orientation,
    pub margins: Margins,
    pub scale: Option<f64>,
    pub print_background: bool,
    pub page_ranges: Option<String>,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            stock: PaperStock::a4(),
            orientation: Orientation::Portrait,
            margins: Margins::default(),
            scale: None,
            print_background: false,
            page_ranges: None,
        }
    }
}

impl PageSetup {
    /// Paper width and height in inches, after applying the orientation.
    pub fn paper_size_inches(&self) -> (f64, f64) {
        let (w, h) = (mm_to_inch(self.stock.width_mm), mm_to_inch(self.stock.height_mm));
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}
