/// Size formatting utilities: human-readable byte counts for display.
///
/// Values are divided by 1024 once per unit step and rounded **up** at each
/// step (whole numbers for KB, two decimals otherwise), so a non-empty file
/// never shows as zero. Output uses thousand separators and drops trailing
/// zeros: `1,234.5MB`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    const ALL: [SizeUnit; 5] = [Self::B, Self::KB, Self::MB, Self::GB, Self::TB];

    pub fn label(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::KB => "KB",
            Self::MB => "MB",
            Self::GB => "GB",
            Self::TB => "TB",
        }
    }

    fn steps(self) -> u32 {
        self as u32
    }

    /// Largest unit in which `bytes` is at least 1.
    pub fn best_for(bytes: u64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|unit| bytes >= 1024u64.pow(unit.steps()))
            .unwrap_or(Self::B)
    }
}

/// Format `bytes` in `unit`.
pub fn format_size(bytes: u64, unit: SizeUnit) -> String {
    // Work in hundredths to keep the rounding exact.
    let mut hundredths: u128 = u128::from(bytes) * 100;
    for _ in 0..unit.steps() {
        hundredths = hundredths.div_ceil(1024);
        if unit == SizeUnit::KB {
            hundredths = hundredths.div_ceil(100) * 100;
        }
    }

    let whole = hundredths / 100;
    let frac = hundredths % 100;
    let mut out = group_thousands(whole);
    match frac {
        0 => {}
        f if f % 10 == 0 => out.push_str(&format!(".{}", f / 10)),
        f => out.push_str(&format!(".{f:02}")),
    }
    out.push_str(unit.label());
    out
}

/// Format `bytes` in whichever unit reads best.
pub fn format_size_auto(bytes: u64) -> String {
    format_size(bytes, SizeUnit::best_for(bytes))
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
