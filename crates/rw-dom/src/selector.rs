//! Minimal CSS selector engine for the in-memory document.
//!
//! Supports the subset the page enhancements use: selector lists (`h2, h3`),
//! type selectors, `*`, `#id`, `.class` (compound, e.g. `div.sidebar`), the
//! descendant combinator (whitespace) and the child combinator (`>`).

/// Selector parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} in {selector:?}")]
pub struct SelectorError {
    /// The selector text.
    pub selector: String,
    /// What went wrong.
    pub message: String,
}

/// Tree view the matcher walks.
pub(crate) trait SelectorContext {
    type Node: Copy;

    fn tag(&self, node: Self::Node) -> &str;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// One comma-separated alternative: compounds joined by combinators, left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    first: Compound,
    rest: Vec<(Combinator, Compound)>,
}

/// Parsed selector list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let error = |message: &str| SelectorError {
            selector: selector.to_owned(),
            message: message.to_owned(),
        };

        let alternatives = selector
            .split(',')
            .map(|part| parse_complex(part.trim()).map_err(|message| error(message)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { alternatives })
    }

    /// Check whether `node` matches any alternative.
    pub(crate) fn matches<C: SelectorContext>(&self, ctx: &C, node: C::Node) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex_matches(ctx, complex, node))
    }
}

fn parse_complex(text: &str) -> Result<Complex, &'static str> {
    if text.is_empty() {
        return Err("empty selector");
    }

    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            continue;
        }
        if c == '>' {
            chars.next();
            if compounds.is_empty() || pending == Some(Combinator::Child) {
                return Err("unexpected '>'");
            }
            pending = Some(Combinator::Child);
            continue;
        }

        let compound = parse_compound(&mut chars)?;
        if !compounds.is_empty() {
            combinators.push(pending.take().ok_or("missing combinator")?);
        }
        pending = None;
        compounds.push(compound);
    }

    if pending == Some(Combinator::Child) {
        return Err("dangling combinator");
    }

    let mut compounds = compounds.into_iter();
    let first = compounds.next().ok_or("empty selector")?;
    Ok(Complex {
        first,
        rest: combinators.into_iter().zip(compounds).collect(),
    })
}

fn parse_compound(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<Compound, &'static str> {
    let mut compound = Compound::default();

    if chars.peek() == Some(&'*') {
        chars.next();
    } else if chars.peek().is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(read_ident(chars).to_ascii_lowercase());
    }

    loop {
        match chars.peek() {
            Some('#') => {
                chars.next();
                let id = read_ident(chars);
                if id.is_empty() {
                    return Err("empty id selector");
                }
                compound.id = Some(id);
            }
            Some('.') => {
                chars.next();
                let class = read_ident(chars);
                if class.is_empty() {
                    return Err("empty class selector");
                }
                compound.classes.push(class);
            }
            Some(c) if c.is_whitespace() || *c == '>' => break,
            None => break,
            Some(_) => return Err("unsupported selector syntax"),
        }
    }

    Ok(compound)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn compound_matches<C: SelectorContext>(ctx: &C, compound: &Compound, node: C::Node) -> bool {
    if let Some(tag) = &compound.tag
        && ctx.tag(node) != tag
    {
        return false;
    }
    if let Some(id) = &compound.id
        && ctx.attribute(node, "id") != Some(id.as_str())
    {
        return false;
    }
    if compound.classes.is_empty() {
        return true;
    }
    let class_attr = ctx.attribute(node, "class").unwrap_or_default();
    compound
        .classes
        .iter()
        .all(|class| class_attr.split_whitespace().any(|c| c == class))
}

fn complex_matches<C: SelectorContext>(ctx: &C, complex: &Complex, node: C::Node) -> bool {
    let compounds: Vec<&Compound> = std::iter::once(&complex.first)
        .chain(complex.rest.iter().map(|(_, c)| c))
        .collect();
    let combinators: Vec<Combinator> = complex.rest.iter().map(|(c, _)| *c).collect();
    matches_from(ctx, &compounds, &combinators, compounds.len() - 1, node)
}

/// Match `compounds[..=index]` with `compounds[index]` anchored at `node`.
fn matches_from<C: SelectorContext>(
    ctx: &C,
    compounds: &[&Compound],
    combinators: &[Combinator],
    index: usize,
    node: C::Node,
) -> bool {
    if !compound_matches(ctx, compounds[index], node) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match combinators[index - 1] {
        Combinator::Child => ctx
            .parent_element(node)
            .is_some_and(|parent| matches_from(ctx, compounds, combinators, index - 1, parent)),
        Combinator::Descendant => {
            let mut ancestor = ctx.parent_element(node);
            while let Some(current) = ancestor {
                if matches_from(ctx, compounds, combinators, index - 1, current) {
                    return true;
                }
                ancestor = ctx.parent_element(current);
            }
            false
        }
    }
}
