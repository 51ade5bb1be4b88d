//! Predicates over already-decoded descriptors. Nothing here fetches.

use scry_classfile::names::object_descriptor;
use scry_classfile::Annotation;

use crate::descriptor::{AnnotationBearer, ClassDescriptor, MethodIdentity, TypeHandle};

/// True iff `bearer` has a runtime-visible annotation whose type descriptor
/// is exactly `descriptor` (e.g. `Ljava/lang/Deprecated;`).
pub fn has_annotation<B: AnnotationBearer + ?Sized>(descriptor: &str, bearer: &B) -> bool {
    has_annotation_in(descriptor, bearer.annotations())
}

/// Like [`has_annotation`], naming the annotation type by handle.
pub fn has_annotation_type<T, B>(annotation_type: &T, bearer: &B) -> bool
where
    T: TypeHandle + ?Sized,
    B: AnnotationBearer + ?Sized,
{
    has_annotation(&object_descriptor(&annotation_type.binary_name()), bearer)
}

pub fn has_annotation_in(descriptor: &str, annotations: &[Annotation]) -> bool {
    annotations.iter().any(|a| a.type_descriptor == descriptor)
}

/// Name plus generic signature. Two overloads whose generic signatures are
/// both absent compare equal even if their raw descriptors differ.
pub fn methods_equal(m1: &MethodIdentity, m2: &MethodIdentity) -> bool {
    m1.name == m2.name && m1.signature == m2.signature
}

pub fn has_method(method: &MethodIdentity, methods: &[MethodIdentity]) -> bool {
    methods.iter().any(|m| methods_equal(method, m))
}

pub fn declares_method(method: &MethodIdentity, class: &ClassDescriptor) -> bool {
    has_method(method, &class.methods)
}

/// Nominal identity: same binary name, regardless of content.
pub fn classes_equal(c1: &ClassDescriptor, c2: &ClassDescriptor) -> bool {
    c1.name == c2.name
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPRECATED: &str = "Ljava/lang/Deprecated;";

    fn method(name: &str, descriptor: &str, signature: Option<&str>) -> MethodIdentity {
        MethodIdentity {
            descriptor: descriptor.to_string(),
            ..MethodIdentity::new(name, signature)
        }
    }

    #[test]
    fn annotation_presence_is_exact_match() {
        let none: Vec<Annotation> = Vec::new();
        assert!(!has_annotation(DEPRECATED, &none));
        assert!(has_annotation(DEPRECATED, &vec![Annotation::new(DEPRECATED)]));
        assert!(!has_annotation(
            DEPRECATED,
            &vec![Annotation::new("Ljava/lang/FunctionalInterface;")]
        ));
        assert!(!has_annotation("Ljava/lang/Deprecated", &vec![Annotation::new(DEPRECATED)]));
        assert!(has_annotation_in(DEPRECATED, &[Annotation::new(DEPRECATED)]));
    }

    #[test]
    fn annotation_presence_by_type_handle() {
        let anns = vec![Annotation::new(DEPRECATED)];
        let handle = Annotation::new("Ljava/lang/Deprecated;");
        assert!(has_annotation_type(&handle, &anns));
        assert!(!has_annotation_type(&Annotation::new("Lcom/example/Other;"), &anns));
    }

    #[test]
    fn invisible_annotations_are_not_consulted() {
        let mut m = MethodIdentity::new("run", None);
        m.invisible_annotations.push(Annotation::new(DEPRECATED));
        assert!(!has_annotation(DEPRECATED, &m));
        assert_eq!(m.invisible_annotations().len(), 1);
    }

    #[test]
    fn method_equality_ignores_raw_descriptor() {
        let a = method("get", "(Ljava/lang/Object;)Ljava/lang/Object;", Some("(TK;)TV;"));
        let b = method("get", "(Ljava/lang/String;)Ljava/lang/Integer;", Some("(TK;)TV;"));
        assert!(methods_equal(&a, &b));

        let c = method("get", "(I)V", None);
        let d = method("get", "(J)V", None);
        assert!(methods_equal(&c, &d));

        assert!(!methods_equal(&a, &c));
        assert!(!methods_equal(&a, &method("put", "", Some("(TK;)TV;"))));
    }

    #[test]
    fn has_method_scans_the_list() {
        let methods = vec![method("a", "()V", None), method("b", "()V", Some("()TT;"))];
        assert!(has_method(&MethodIdentity::new("b", Some("()TT;")), &methods));
        assert!(!has_method(&MethodIdentity::new("b", None), &methods));
        assert!(!has_method(&MethodIdentity::new("a", None), &[]));
    }
}
