// src/commands/declarations.rs
//! User class and interface declarations read from TOML.
//!
//! ```toml
//! [[interface]]
//! name = "Named"
//! getters = { name = "String" }
//!
//! [[class]]
//! name = "Widget"
//! extends = "HTMLElement"
//! implements = ["Named"]
//! constructors = [["String"], []]
//! properties = { name = "String" }
//! methods = { render = "() => void" }
//! setters = { onchange = "(String) => void" }
//! ```
//!
//! Member types use the same notation as the command line. Interfaces are
//! declared before classes; within each table, in file order, so a parent
//! must appear before its children.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::context::{Context, Span};
use crate::errors::{NotationError, TypeError};
use crate::sema::{Checker, ClassDecl, InterfaceDecl, TypeId, TypeKind, parse_type};

#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("could not read declarations '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse declarations TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("in declaration of {entry}: {source}")]
    Notation {
        entry: String,
        text: String,
        #[source]
        source: NotationError,
    },
    #[error("{name} is not an interface")]
    NotAnInterface { name: String },
    #[error(transparent)]
    Type(#[from] TypeError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Declarations {
    #[serde(rename = "interface")]
    pub interfaces: Vec<InterfaceEntry>,
    #[serde(rename = "class")]
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceEntry {
    pub name: String,
    pub extends: Vec<String>,
    pub rpc: bool,
    pub getters: BTreeMap<String, String>,
    pub setters: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassEntry {
    pub name: String,
    pub extends: Option<String>,
    #[serde(rename = "final")]
    pub is_final: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub universal: bool,
    pub implements: Vec<String>,
    pub constructors: Vec<Vec<String>>,
    pub properties: BTreeMap<String, String>,
    pub readonly: BTreeMap<String, String>,
    pub methods: BTreeMap<String, String>,
    pub setters: BTreeMap<String, String>,
    pub statics: BTreeMap<String, String>,
}

impl Declarations {
    pub fn from_toml_str(src: &str) -> Result<Self, DeclarationError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, DeclarationError> {
        let content = std::fs::read_to_string(path).map_err(|source| DeclarationError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let decls = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            interfaces = decls.interfaces.len(),
            classes = decls.classes.len(),
            "loaded declarations"
        );
        Ok(decls)
    }

    /// Declare everything in `checker`, attributing errors to `origin`.
    pub fn declare_all(&self, checker: &mut Checker, origin: &str) -> Result<(), DeclarationError> {
        let ctx = Context::new(origin, Span::default());
        for entry in &self.interfaces {
            let mut decl = InterfaceDecl::new(&entry.name);
            for parent in &entry.extends {
                let ty = resolve(checker, &entry.name, parent)?;
                match checker.arena().get(ty) {
                    TypeKind::Interface(id) => decl = decl.extends(*id),
                    _ => {
                        return Err(DeclarationError::NotAnInterface {
                            name: parent.clone(),
                        });
                    }
                }
            }
            for (key, text) in &entry.getters {
                decl = decl.getter(key, resolve(checker, &entry.name, text)?);
            }
            for (key, text) in &entry.setters {
                decl = decl.setter(key, resolve(checker, &entry.name, text)?);
            }
            if entry.rpc {
                decl = decl.rpc();
            }
            checker.declare_interface(decl, &ctx)?;
        }

        for entry in &self.classes {
            let decl = class_decl(checker, entry)?;
            checker.declare_class(decl, &ctx)?;
        }
        Ok(())
    }
}

fn class_decl(checker: &mut Checker, entry: &ClassEntry) -> Result<ClassDecl, DeclarationError> {
    let name = entry.name.as_str();
    let mut decl = ClassDecl::new(name);
    if let Some(parent) = &entry.extends {
        decl = decl.extends(resolve(checker, name, parent)?);
    }
    for params in &entry.constructors {
        let params = params
            .iter()
            .map(|p| resolve(checker, name, p))
            .collect::<Result<Vec<_>, _>>()?;
        decl = decl.constructor(params);
    }
    for (key, text) in &entry.properties {
        decl = decl.property(key, resolve(checker, name, text)?);
    }
    for (key, text) in &entry.readonly {
        decl = decl.readonly(key, resolve(checker, name, text)?);
    }
    for (key, text) in &entry.methods {
        decl = decl.method(key, resolve(checker, name, text)?);
    }
    for (key, text) in &entry.setters {
        decl = decl.setter(key, resolve(checker, name, text)?);
    }
    for (key, text) in &entry.statics {
        decl = decl.static_member(key, resolve(checker, name, text)?);
    }
    for interface in &entry.implements {
        decl = decl.implements(resolve(checker, name, interface)?);
    }
    if entry.is_final {
        decl = decl.final_class();
    }
    if entry.is_abstract {
        decl = decl.abstract_class();
    }
    if entry.universal {
        decl = decl.universal();
    }
    Ok(decl)
}

fn resolve(checker: &mut Checker, entry: &str, text: &str) -> Result<TypeId, DeclarationError> {
    parse_type(checker.arena_mut(), text).map_err(|source| DeclarationError::Notation {
        entry: entry.to_string(),
        text: text.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::Value;

    const WIDGETS: &str = r#"
[[interface]]
name = "Named"
getters = { name = "String" }

[[class]]
name = "Widget"
extends = "HTMLElement"
implements = ["Named"]
constructors = [["String"]]
properties = { name = "String" }
methods = { render = "() => void" }

[[class]]
name = "Button"
extends = "Widget"
final = true
"#;

    #[test]
    fn declares_in_order() {
        let mut checker = Checker::default();
        let decls = Declarations::from_toml_str(WIDGETS).unwrap();
        decls.declare_all(&mut checker, "widgets.toml").unwrap();

        let named = checker.arena().lookup_name("Named").unwrap();
        let button = checker.arena().lookup_name("Button").unwrap();
        let element = checker.arena().lookup_name("Element").unwrap();
        let ctx = Context::dummy();
        assert!(checker.check(named, button, &ctx).is_ok());
        assert!(checker.check(element, button, &ctx).is_ok());

        let b = Value::new(button, &ctx);
        let render = checker.get_member(&b, "render", &ctx).unwrap();
        assert_eq!(checker.display(render.type_id()), "function<void>");
    }

    #[test]
    fn final_parents_are_rejected() {
        let mut checker = Checker::default();
        let src = format!("{}\n[[class]]\nname = \"Fancy\"\nextends = \"Button\"\n", WIDGETS);
        let decls = Declarations::from_toml_str(&src).unwrap();
        let err = decls.declare_all(&mut checker, "widgets.toml").unwrap_err();
        assert_eq!(err.to_string(), "can't extend final Button");
    }

    #[test]
    fn bad_notation_names_the_entry() {
        let mut checker = Checker::default();
        let decls = Declarations::from_toml_str("[[class]]\nname = \"A\"\nextends = \"Nope\"\n").unwrap();
        let err = decls.declare_all(&mut checker, "a.toml").unwrap_err();
        assert!(matches!(err, DeclarationError::Notation { ref entry, .. } if entry == "A"));
    }

    #[test]
    fn universal_classes_are_checked() {
        let mut checker = Checker::default();
        let decls = Declarations::from_toml_str(
            "[[class]]\nname = \"Leak\"\nuniversal = true\nproperties = { w = \"Window\" }\n",
        )
        .unwrap();
        let err = decls.declare_all(&mut checker, "leak.toml").unwrap_err();
        assert_eq!(err.to_string(), "universal class Leak holds non-universal member w: Window");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Declarations::from_toml_str("[[class]]\nname = \"A\"\ncolour = \"red\"\n").unwrap_err();
        assert!(matches!(err, DeclarationError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", WIDGETS).unwrap();
        let decls = Declarations::load(file.path()).unwrap();
        assert_eq!(decls.classes.len(), 2);
        assert_eq!(decls.interfaces[0].name, "Named");
    }
}
