//! Model type descriptors and ancestry resolution.
//!
//! A model type is identified by its name. Its ancestry is the C3
//! linearization of its declared bases, ordered from the type itself to the
//! most-base ancestor. Single inheritance degenerates to the parent chain.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::ptr;
use std::sync::OnceLock;

use crate::error::{PermissionsError, PermissionsResult};

/// Lazily resolves the descriptor of a base model.
///
/// Bases are stored as function pointers so that descriptors can be plain
/// `static` items referring to each other in any declaration order.
pub type DescriptorFn = fn() -> &'static ModelDescriptor;

/// Static description of a model type participating in permission checks.
pub struct ModelDescriptor {
    name: &'static str,
    fields: &'static [&'static str],
    bases: &'static [DescriptorFn],
    ancestry: OnceLock<PermissionsResult<Vec<&'static ModelDescriptor>>>,
}

impl ModelDescriptor {
    #[must_use]
    pub const fn new(
        name: &'static str,
        fields: &'static [&'static str],
        bases: &'static [DescriptorFn],
    ) -> Self {
        Self {
            name,
            fields,
            bases,
            ancestry: OnceLock::new(),
        }
    }

    /// Unique model name; the registry is keyed by it.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Attribute names declared directly on this model.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Direct bases, in declaration order.
    #[must_use]
    pub fn bases(&self) -> impl Iterator<Item = &'static ModelDescriptor> + '_ {
        self.bases.iter().map(|base| base())
    }

    /// Returns `true` if both references point at the same descriptor.
    #[inline]
    #[must_use]
    pub fn is_same(&self, other: &ModelDescriptor) -> bool {
        ptr::eq(self, other)
    }

    /// C3 linearization of this model, from itself to the most-base ancestor.
    ///
    /// Computed on first use and cached for the life of the descriptor.
    ///
    /// # Errors
    ///
    /// - [`PermissionsError::CyclicHierarchy`] if a model inherits from itself,
    ///   directly or transitively.
    /// - [`PermissionsError::InconsistentHierarchy`] if the bases admit no
    ///   order that preserves every local precedence.
    pub fn ancestry(&'static self) -> PermissionsResult<&'static [&'static ModelDescriptor]> {
        let resolved = self
            .ancestry
            .get_or_init(|| linearize(self, &mut Vec::new(), &mut HashMap::new()));
        match resolved {
            Ok(order) => Ok(order.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Every attribute name declared on this model or any of its ancestors.
    ///
    /// # Errors
    ///
    /// Propagates ancestry resolution errors.
    pub fn all_fields(&'static self) -> PermissionsResult<BTreeSet<&'static str>> {
        Ok(self
            .ancestry()?
            .iter()
            .flat_map(|model| model.fields.iter().copied())
            .collect())
    }
}

impl fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<&str> = self.bases().map(ModelDescriptor::name).collect();
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("bases", &bases)
            .finish()
    }
}

/// A Rust type that participates in permission checks.
///
/// Usually implemented through `#[derive(Model)]`.
pub trait Model {
    fn descriptor() -> &'static ModelDescriptor;
}

/// Linearizations already computed during one resolution, keyed by model name.
type Resolved = HashMap<&'static str, Vec<&'static ModelDescriptor>>;

/// Linearization of a base, reusing earlier results so that shared ancestors
/// are resolved once.
fn linearize_base(
    base: &'static ModelDescriptor,
    visiting: &mut Vec<&'static str>,
    resolved: &mut Resolved,
) -> PermissionsResult<Vec<&'static ModelDescriptor>> {
    if let Some(Ok(order)) = base.ancestry.get() {
        return Ok(order.clone());
    }
    if let Some(order) = resolved.get(base.name) {
        return Ok(order.clone());
    }
    let order = linearize(base, visiting, resolved)?;
    resolved.insert(base.name, order.clone());
    Ok(order)
}

fn linearize(
    model: &'static ModelDescriptor,
    visiting: &mut Vec<&'static str>,
    resolved: &mut Resolved,
) -> PermissionsResult<Vec<&'static ModelDescriptor>> {
    if visiting.contains(&model.name) {
        return Err(PermissionsError::CyclicHierarchy {
            model: model.name.to_owned(),
        });
    }
    visiting.push(model.name);

    let mut sequences: Vec<VecDeque<&'static ModelDescriptor>> = Vec::new();
    for base in model.bases() {
        sequences.push(linearize_base(base, visiting, resolved)?.into());
    }
    sequences.push(model.bases().collect());
    visiting.pop();

    let mut order = vec![model];
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(order);
        }

        // First head that does not appear in the tail of any sequence.
        let head = sequences
            .iter()
            .filter_map(|seq| seq.front().copied())
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|m| m.name == candidate.name))
            })
            .ok_or_else(|| PermissionsError::InconsistentHierarchy {
                model: model.name.to_owned(),
            })?;

        order.push(head);
        for seq in &mut sequences {
            if seq.front().is_some_and(|m| m.name == head.name) {
                seq.pop_front();
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    macro_rules! descriptor {
        ($fn_name:ident, $name:literal, [$($field:literal),*], [$($base:ident),*]) => {
            fn $fn_name() -> &'static ModelDescriptor {
                static DESCRIPTOR: ModelDescriptor =
                    ModelDescriptor::new($name, &[$($field),*], &[$($base),*]);
                &DESCRIPTOR
            }
        };
    }

    // Diamond: D(B, C), B(A), C(A)
    descriptor!(a, "A", ["id"], []);
    descriptor!(b, "B", ["b"], [a]);
    descriptor!(c, "C", ["c"], [a]);
    descriptor!(d, "D", ["d"], [b, c]);

    // X(Y), Y(X)
    descriptor!(x, "X", [], [y]);
    descriptor!(y, "Y", [], [x]);

    // Q(A, B) where B already derives from A: A must come after B.
    descriptor!(q, "Q", [], [a, b]);

    fn names(order: &[&'static ModelDescriptor]) -> Vec<&'static str> {
        order.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn root_model_ancestry_is_itself() {
        assert_eq!(names(&a().ancestry().unwrap()), ["A"]);
    }

    #[test]
    fn single_inheritance_is_the_parent_chain() {
        assert_eq!(names(&b().ancestry().unwrap()), ["B", "A"]);
    }

    #[test]
    fn diamond_follows_c3_order() {
        assert_eq!(names(&d().ancestry().unwrap()), ["D", "B", "C", "A"]);
    }

    #[test]
    fn cycle_is_reported() {
        assert!(matches!(
            x().ancestry(),
            Err(PermissionsError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn inconsistent_precedence_is_reported() {
        assert_eq!(
            q().ancestry().unwrap_err(),
            PermissionsError::InconsistentHierarchy {
                model: "Q".to_owned()
            }
        );
    }

    #[test]
    fn ancestry_is_resolved_once() {
        let first = d().ancestry().unwrap();
        let second = d().ancestry().unwrap();
        assert!(ptr::eq(first, second));
    }

    #[test]
    fn all_fields_include_ancestors() {
        let fields = d().all_fields().unwrap();
        assert_eq!(fields.into_iter().collect::<Vec<_>>(), ["b", "c", "d", "id"]);
    }

    #[test]
    fn debug_lists_base_names() {
        let rendered = format!("{:?}", d());
        assert!(rendered.contains("bases: [\"B\", \"C\"]"));
    }
}
