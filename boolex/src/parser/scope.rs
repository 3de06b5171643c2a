//! Scope handling: binds, namespaces and symbol tables.
//!
//! A host names its variables and functions by *binding* them, groups the
//! binds into a tree of *namespaces*, and hands the root namespace to an
//! evaluable parser. The parser never touches namespaces directly — it
//! resolves identifiers against a [`SymbolTable`], the read-only,
//! per-locale view a namespace derives on demand and caches.
//!
//! Ownership is strictly tree-shaped: attaching a bind or a sub-namespace
//! moves it into its parent, so nothing can belong to two namespaces and
//! there are no back-references to keep consistent.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::error::{BoolexError, BoolexResult};
use crate::nodes::{Function, Variable};

/// What a bind points at.
pub enum BindTarget<C> {
    Variable(Arc<dyn Variable<C>>),
    Function(Arc<dyn Function<C>>),
}

impl<C> std::fmt::Debug for BindTarget<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindTarget::Variable(_) => f.write_str("BindTarget::Variable(..)"),
            BindTarget::Function(_) => f.write_str("BindTarget::Function(..)"),
        }
    }
}

impl<C> Clone for BindTarget<C> {
    fn clone(&self) -> Self {
        match self {
            BindTarget::Variable(variable) => BindTarget::Variable(Arc::clone(variable)),
            BindTarget::Function(function) => BindTarget::Function(Arc::clone(function)),
        }
    }
}

/// Look a name up in a localisation map, falling back to the global name.
fn localized<'a>(
    names: &'a BTreeMap<String, String>,
    global_name: &'a str,
    locale: &str,
) -> &'a str {
    match names.get(locale) {
        Some(name) => name,
        None => {
            warn!(
                "\"{}\" doesn't have a name in {}; using the global one",
                global_name, locale
            );
            global_name
        }
    }
}

/// A named attachment of a variable or function.
///
/// A bind is created unowned; adding it to a namespace moves it there, so
/// re-attaching it elsewhere is not expressible.
pub struct Bind<C> {
    global_name: String,
    names: BTreeMap<String, String>,
    target: BindTarget<C>,
}

impl<C> std::fmt::Debug for Bind<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bind")
            .field("global_name", &self.global_name)
            .field("names", &self.names)
            .field("target", &self.target)
            .finish()
    }
}

impl<C> Bind<C> {
    /// Bind `variable` under `global_name`.
    ///
    /// The variable must advertise at least one datatype; a capability-less
    /// operand can never be used by any operator.
    pub fn variable(
        global_name: impl Into<String>,
        variable: Arc<dyn Variable<C>>,
    ) -> BoolexResult<Self> {
        let global_name = global_name.into().to_lowercase();
        if variable.datatypes().is_empty() {
            return Err(BoolexError::BadOperand(format!(
                "variable \"{}\" must support at least one datatype",
                global_name
            )));
        }
        Ok(Bind {
            global_name,
            names: BTreeMap::new(),
            target: BindTarget::Variable(variable),
        })
    }

    /// Bind `function` under `global_name`, validating its signature.
    pub fn function(
        global_name: impl Into<String>,
        function: Arc<dyn Function<C>>,
    ) -> BoolexResult<Self> {
        let global_name = global_name.into().to_lowercase();
        if function.datatypes().is_empty() {
            return Err(BoolexError::BadOperand(format!(
                "function \"{}\" must support at least one datatype",
                global_name
            )));
        }
        function.signature().validate(&global_name)?;
        Ok(Bind {
            global_name,
            names: BTreeMap::new(),
            target: BindTarget::Function(function),
        })
    }

    /// Add the name this bind takes in `locale`.
    pub fn with_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names
            .insert(locale.into(), name.into().to_lowercase());
        self
    }

    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    /// The name of this bind in `locale`, or the global name when it has
    /// no localisation there.
    pub fn localized_name(&self, locale: &str) -> &str {
        localized(&self.names, &self.global_name, locale)
    }

    pub fn target(&self) -> &BindTarget<C> {
        &self.target
    }

    /// Two binds are equivalent when they carry the same names, regardless
    /// of what they wrap.
    fn equivalent(&self, other: &Self) -> bool {
        self.global_name == other.global_name && self.names == other.names
    }
}

/// A node in the scope tree: binds plus sub-namespaces, each localisable.
pub struct Namespace<C> {
    global_name: String,
    names: BTreeMap<String, String>,
    binds: Vec<Bind<C>>,
    children: Vec<Namespace<C>>,
    table_cache: RwLock<BTreeMap<Option<String>, Arc<SymbolTable<C>>>>,
}

impl<C> Namespace<C> {
    pub fn new(global_name: impl Into<String>) -> Self {
        Namespace {
            global_name: global_name.into().to_lowercase(),
            names: BTreeMap::new(),
            binds: Vec::new(),
            children: Vec::new(),
            table_cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Add the name this namespace takes in `locale`.
    pub fn with_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names
            .insert(locale.into(), name.into().to_lowercase());
        self
    }

    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    pub fn localized_name(&self, locale: &str) -> &str {
        localized(&self.names, &self.global_name, locale)
    }

    pub fn binds(&self) -> &[Bind<C>] {
        &self.binds
    }

    pub fn children(&self) -> &[Namespace<C>] {
        &self.children
    }

    /// Attach `bind` to this namespace, taking ownership of it.
    pub fn add_bind(&mut self, bind: Bind<C>) -> BoolexResult<()> {
        if self.binds.iter().any(|existing| existing.equivalent(&bind)) {
            return Err(BoolexError::Scope(format!(
                "an equivalent of \"{}\" is already defined in namespace \"{}\"",
                bind.global_name, self.global_name
            )));
        }
        self.table_cache.get_mut().clear();
        self.binds.push(bind);
        Ok(())
    }

    /// Attach `namespace` as a sub-namespace, taking ownership of it.
    pub fn add_namespace(&mut self, namespace: Namespace<C>) -> BoolexResult<()> {
        let duplicate = self.children.iter().any(|existing| {
            existing.global_name == namespace.global_name && existing.names == namespace.names
        });
        if duplicate {
            return Err(BoolexError::Scope(format!(
                "an equivalent of namespace \"{}\" is already available in namespace \"{}\"",
                namespace.global_name, self.global_name
            )));
        }
        self.table_cache.get_mut().clear();
        self.children.push(namespace);
        Ok(())
    }

    /// Make sure there is no name clash anywhere in this namespace tree.
    ///
    /// A bind and a sub-namespace may share a name; two binds may not, and
    /// neither may two sub-namespaces — checked for the global names and
    /// then again for every locale in use. Runs in one pass over the tree;
    /// intended to be called before parsing starts.
    pub fn validate(&self) -> BoolexResult<()> {
        self.validate_at(&self.global_name)
    }

    fn validate_at(&self, path: &str) -> BoolexResult<()> {
        let mut bind_names: Vec<&str> = Vec::new();
        for bind in &self.binds {
            if bind_names.contains(&bind.global_name.as_str()) {
                return Err(BoolexError::Scope(format!(
                    "two or more binds in namespace \"{}\" share the global name \"{}\"",
                    path, bind.global_name
                )));
            }
            bind_names.push(&bind.global_name);
        }

        let mut child_names: Vec<&str> = Vec::new();
        for child in &self.children {
            if child_names.contains(&child.global_name.as_str()) {
                return Err(BoolexError::Scope(format!(
                    "two or more sub-namespaces in namespace \"{}\" share the global name \
                     \"{}\"",
                    path, child.global_name
                )));
            }
            child_names.push(&child.global_name);
        }

        // Localised names must be unique per locale too, binds and
        // sub-namespaces separately.
        let mut locales: Vec<&str> = Vec::new();
        for names in self
            .binds
            .iter()
            .map(|bind| &bind.names)
            .chain(self.children.iter().map(|child| &child.names))
        {
            for locale in names.keys() {
                if !locales.contains(&locale.as_str()) {
                    locales.push(locale);
                }
            }
        }
        for locale in &locales {
            let mut used: Vec<&str> = Vec::new();
            for bind in &self.binds {
                let name = bind.localized_name(locale);
                if used.contains(&name) {
                    return Err(BoolexError::Scope(format!(
                        "the name \"{}\" is shared by two or more binds in namespace \"{}\" \
                         (locale: {})",
                        name, path, locale
                    )));
                }
                used.push(name);
            }
            let mut used: Vec<&str> = Vec::new();
            for child in &self.children {
                let name = child.localized_name(locale);
                if used.contains(&name) {
                    return Err(BoolexError::Scope(format!(
                        "the name \"{}\" is shared by two or more sub-namespaces in \
                         namespace \"{}\" (locale: {})",
                        name, path, locale
                    )));
                }
                used.push(name);
            }
        }

        for child in &self.children {
            let child_path = format!("{}:{}", path, child.global_name);
            child.validate_at(&child_path)?;
        }
        Ok(())
    }

    /// The symbol table for this namespace in `locale`; global names when
    /// `locale` is `None`.
    ///
    /// Tables are derived once per locale and cached; namespaces are
    /// immutable once parsers start resolving against them, so the cache
    /// never goes stale.
    pub fn symbol_table(&self, locale: Option<&str>) -> Arc<SymbolTable<C>> {
        let key = locale.map(str::to_string);
        if let Some(table) = self.table_cache.read().get(&key) {
            return Arc::clone(table);
        }
        debug!(
            "deriving the symbol table of namespace \"{}\" for locale {:?}",
            self.global_name, locale
        );
        let table = Arc::new(self.derive_table(locale));
        let mut cache = self.table_cache.write();
        Arc::clone(cache.entry(key).or_insert(table))
    }

    fn derive_table(&self, locale: Option<&str>) -> SymbolTable<C> {
        let name_of = |global: &str, names: &BTreeMap<String, String>| match locale {
            Some(locale) => localized(names, global, locale).to_string(),
            None => global.to_string(),
        };

        let mut objects = BTreeMap::new();
        for bind in &self.binds {
            objects.insert(
                name_of(&bind.global_name, &bind.names),
                bind.target.clone(),
            );
        }
        let mut subtables = BTreeMap::new();
        for child in &self.children {
            subtables.insert(
                name_of(&child.global_name, &child.names),
                child.symbol_table(locale),
            );
        }
        SymbolTable { objects, subtables }
    }
}

/// A per-locale, read-only materialisation of a namespace.
///
/// This is what the parser resolves identifiers against; hosts normally
/// never build one by hand.
pub struct SymbolTable<C> {
    objects: BTreeMap<String, BindTarget<C>>,
    subtables: BTreeMap<String, Arc<SymbolTable<C>>>,
}

impl<C> SymbolTable<C> {
    /// Resolve the object called `name` under the sub-table path `path`.
    pub fn resolve(&self, path: &[String], name: &str) -> BoolexResult<&BindTarget<C>> {
        let mut table = self;
        for segment in path {
            table = match table.subtables.get(segment) {
                Some(subtable) => subtable,
                None => return Err(Self::missing(path, name)),
            };
        }
        table.objects.get(name).ok_or_else(|| Self::missing(path, name))
    }

    fn missing(path: &[String], name: &str) -> BoolexError {
        if path.is_empty() {
            BoolexError::Scope(format!("no such object \"{}\"", name))
        } else {
            BoolexError::Scope(format!(
                "no such object \"{}\" in \"{}\"",
                name,
                path.join(":")
            ))
        }
    }
}
