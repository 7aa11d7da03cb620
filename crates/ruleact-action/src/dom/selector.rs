//! Compound simple selectors: `tag#id.class[attr=value]`, comma separated.
//!
//! Combinators (descendant, child, sibling) and pseudo-classes are rejected.

/// Something a selector can be matched against.
pub trait SelectorTarget {
    fn tag(&self) -> &str;
    fn attribute(&self, name: &str) -> Option<String>;
    fn has_class(&self, class: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Unsupported selector syntax at offset {offset} in \"{selector}\"")]
    Unsupported { selector: String, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn matches(&self, target: &dyn SelectorTarget) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(target.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if target.attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| target.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|a| match (&a.value, target.attribute(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => *expected == actual,
        })
    }
}

/// A parsed selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    compounds: Vec<Compound>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let mut compounds = Vec::new();
        let mut offset = 0;
        for part in selector.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return Err(SelectorError::Empty);
            }
            let start = offset + (part.len() - part.trim_start().len());
            compounds.push(parse_compound(trimmed).map_err(|at| SelectorError::Unsupported {
                selector: selector.to_string(),
                offset: start + at,
            })?);
            offset += part.len() + 1;
        }
        Ok(Self { compounds })
    }

    pub fn matches(&self, target: &dyn SelectorTarget) -> bool {
        self.compounds.iter().any(|c| c.matches(target))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse one compound selector. Errors carry the byte offset of the
/// offending character.
fn parse_compound(input: &str) -> Result<Compound, usize> {
    let mut compound = Compound::default();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> Result<String, usize> {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i].1) {
            *i += 1;
        }
        if *i == start {
            return Err(chars.get(start).map(|(o, _)| *o).unwrap_or(input.len()));
        }
        Ok(chars[start..*i].iter().map(|(_, c)| c).collect())
    };

    if i < chars.len() && chars[i].1 == '*' {
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i].1) {
        compound.tag = Some(read_ident(&mut i)?);
    }

    while i < chars.len() {
        let (offset, c) = chars[i];
        match c {
            '#' => {
                i += 1;
                compound.id = Some(read_ident(&mut i)?);
            }
            '.' => {
                i += 1;
                compound.classes.push(read_ident(&mut i)?);
            }
            '[' => {
                i += 1;
                let name = read_ident(&mut i)?;
                let value = if i < chars.len() && chars[i].1 == '=' {
                    i += 1;
                    Some(read_attribute_value(&chars, &mut i, input.len())?)
                } else {
                    None
                };
                if i >= chars.len() || chars[i].1 != ']' {
                    return Err(chars.get(i).map(|(o, _)| *o).unwrap_or(input.len()));
                }
                i += 1;
                compound.attributes.push(AttributeMatch { name, value });
            }
            _ => return Err(offset),
        }
    }

    Ok(compound)
}

fn read_attribute_value(chars: &[(usize, char)], i: &mut usize, end: usize) -> Result<String, usize> {
    let quote = match chars.get(*i) {
        Some((_, q @ ('"' | '\''))) => Some(*q),
        Some(_) => None,
        None => return Err(end),
    };
    if let Some(q) = quote {
        *i += 1;
        let start = *i;
        while *i < chars.len() && chars[*i].1 != q {
            *i += 1;
        }
        if *i >= chars.len() {
            return Err(end);
        }
        let value = chars[start..*i].iter().map(|(_, c)| c).collect();
        *i += 1;
        Ok(value)
    } else {
        let start = *i;
        while *i < chars.len() && is_ident_char(chars[*i].1) {
            *i += 1;
        }
        if *i == start {
            return Err(chars[start].0);
        }
        Ok(chars[start..*i].iter().map(|(_, c)| c).collect())
    }
}
