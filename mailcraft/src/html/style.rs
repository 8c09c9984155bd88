/// Declarations of an inline `style` attribute, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    decls: Vec<(String, String)>,
}

impl Style {
    pub fn parse(source: &str) -> Style {
        let decls = source
            .split(';')
            .filter_map(|decl| {
                let (prop, value) = decl.split_once(':')?;
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim().to_string();
                if prop.is_empty() {
                    None
                } else {
                    Some((prop, value))
                }
            })
            .collect();
        Style { decls }
    }

    /// Value of the last declaration of `prop` (later ones win, as in CSS).
    pub fn get(&self, prop: &str) -> Option<&str> {
        self.decls
            .iter()
            .rev()
            .find(|(p, _)| p == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, prop: &str) -> bool {
        self.get(prop).is_some()
    }

    /// Leading pixel length of `prop`: `"10px"`, `"10"` and `"10px 20px"`
    /// all give 10.
    pub fn px(&self, prop: &str) -> Option<u32> {
        self.get(prop).and_then(px)
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Parse a pixel length, ignoring a trailing `px` and any further values.
pub fn px(value: &str) -> Option<u32> {
    let first = value.split_whitespace().next()?;
    let number = first.trim_end_matches("px");
    if let Ok(n) = number.parse::<u32>() {
        return Some(n);
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.round() as u32)
}
