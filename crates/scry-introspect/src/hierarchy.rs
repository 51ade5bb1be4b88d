//! Assignability between class names, decided by walking class files.
//!
//! The walk fetches one artifact per visited type and follows the superclass
//! edge and then every interface edge, depth-first, stopping at the first
//! path that reaches the requested supertype.

use std::collections::HashSet;

use scry_classfile::names::to_slash_name;
use scry_classpath::ClassSource;

use crate::config::HierarchyConfig;
use crate::decoder::{load_descriptor, ClassFileDecoder, Decoder};
use crate::descriptor::{ClassDescriptor, TypeHandle};
use crate::error::{Error, Result};
use crate::queries::has_annotation;

pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Longest supertype chain the walk follows before giving up with
    /// [`Error::TooDeep`].
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&HierarchyConfig> for ResolverOptions {
    fn from(config: &HierarchyConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }
}

/// Answers hierarchy questions against one class source.
///
/// Holds no state between calls. Every query fetches and decodes what it
/// needs and drops it afterwards; wrap the source if you want caching.
#[derive(Debug, Clone)]
pub struct HierarchyResolver<S, D = ClassFileDecoder> {
    source: S,
    decoder: D,
    options: ResolverOptions,
}

impl<S: ClassSource> HierarchyResolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_decoder(source, ClassFileDecoder)
    }
}

impl<S: ClassSource, D: Decoder> HierarchyResolver<S, D> {
    pub fn with_decoder(source: S, decoder: D) -> Self {
        Self {
            source,
            decoder,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> ResolverOptions {
        self.options
    }

    /// Fetches and decodes one class.
    pub fn load(&self, name: &str, skip_method_bodies: bool) -> Result<ClassDescriptor> {
        load_descriptor(name, skip_method_bodies, &self.source, &self.decoder)
    }

    /// Whether a value of type `subtype` can be assigned to `supertype`.
    ///
    /// `subtype == None` stands for "above the root" and is never assignable.
    /// Names may be dotted or slash form. Every failure to fetch or decode an
    /// ancestor is returned rather than treated as "not assignable".
    pub fn is_assignable_from(&self, supertype: &str, subtype: Option<&str>) -> Result<bool> {
        let supertype = to_slash_name(supertype);
        let mut walk = Walk::new(self, Some(supertype.as_ref()), |_: &ClassDescriptor| false);
        walk.visit(subtype.map(to_slash_name).as_deref(), 0)
    }

    /// [`Self::is_assignable_from`] with the supertype given as a handle.
    pub fn is_assignable_from_type<T: TypeHandle + ?Sized>(
        &self,
        supertype: &T,
        subtype: Option<&str>,
    ) -> Result<bool> {
        self.is_assignable_from(&supertype.binary_name(), subtype)
    }

    /// Whether `class_name` or any of its ancestors carries the runtime-visible
    /// annotation `descriptor`.
    pub fn has_annotation_in_hierarchy(&self, descriptor: &str, class_name: &str) -> Result<bool> {
        let mut walk = Walk::new(self, None, |class: &ClassDescriptor| {
            has_annotation(descriptor, class)
        });
        walk.visit(Some(to_slash_name(class_name).as_ref()), 0)
    }

    /// Dotted names of every class in the source that directly carries the
    /// runtime-visible annotation `descriptor`.
    pub fn annotated_classes(&self, descriptor: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for name in self.source.binary_names()? {
            let class = self.load(&name, true)?;
            if has_annotation(descriptor, &class) {
                out.push(name);
            }
        }
        Ok(out)
    }
}

/// State of one top-level query.
struct Walk<'r, S, D, F> {
    resolver: &'r HierarchyResolver<S, D>,
    /// Reaching this name ends the walk without fetching it.
    target: Option<&'r str>,
    /// Decides from a decoded class alone whether the walk is done.
    matches: F,
    /// Names on the current path; meeting one again means a cycle.
    on_path: HashSet<String>,
    /// Names already fully explored without a match.
    exhausted: HashSet<String>,
}

impl<'r, S, D, F> Walk<'r, S, D, F>
where
    S: ClassSource,
    D: Decoder,
    F: FnMut(&ClassDescriptor) -> bool,
{
    fn new(resolver: &'r HierarchyResolver<S, D>, target: Option<&'r str>, matches: F) -> Self {
        Self {
            resolver,
            target,
            matches,
            on_path: HashSet::new(),
            exhausted: HashSet::new(),
        }
    }

    /// Superclass first, then interfaces in declaration order; the first
    /// success wins and the first failure aborts the whole walk.
    fn visit(&mut self, name: Option<&str>, depth: usize) -> Result<bool> {
        let Some(name) = name else {
            return Ok(false);
        };
        if self.target == Some(name) {
            return Ok(true);
        }
        if self.exhausted.contains(name) {
            return Ok(false);
        }
        if self.on_path.contains(name) {
            return Err(Error::Cycle {
                name: name.to_string(),
            });
        }
        if depth >= self.resolver.options.max_depth {
            return Err(Error::TooDeep {
                name: name.to_string(),
                max_depth: self.resolver.options.max_depth,
            });
        }

        tracing::trace!(target: "scry.hierarchy", name, depth, "visiting class");
        let class = self.resolver.load(name, true)?;
        if (self.matches)(&class) {
            return Ok(true);
        }

        self.on_path.insert(name.to_string());
        for supertype in class.supertypes() {
            if self.visit(Some(supertype), depth + 1)? {
                return Ok(true);
            }
        }
        self.on_path.remove(name);
        self.exhausted.insert(name.to_string());
        Ok(false)
    }
}

/// [`HierarchyResolver::is_assignable_from`] with the default decoder and
/// options.
pub fn is_assignable_from<S: ClassSource + ?Sized>(
    supertype: &str,
    subtype: Option<&str>,
    source: &S,
) -> Result<bool> {
    HierarchyResolver::new(source).is_assignable_from(supertype, subtype)
}

pub fn is_assignable_from_type<T, S>(
    supertype: &T,
    subtype: Option<&str>,
    source: &S,
) -> Result<bool>
where
    T: TypeHandle + ?Sized,
    S: ClassSource + ?Sized,
{
    HierarchyResolver::new(source).is_assignable_from_type(supertype, subtype)
}
