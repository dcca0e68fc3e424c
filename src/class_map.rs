use std::collections::HashMap;

use crate::types::ImageAnnotation;

/// Mapping from label text to a stable non-negative class id.
///
/// Ids start at a configurable base because the two output formats disagree
/// on indexing (YOLO counts from 0, COCO from 1). Derived maps assign ids in
/// lexicographic label order, so the mapping is deterministic for a fixed
/// label set but not stable across label-set drift.
#[derive(Debug, Clone)]
pub struct ClassMap {
    ids: HashMap<String, usize>,
    names: Vec<String>,
    base: usize,
    forced: bool,
}

impl ClassMap {
    /// Build from an explicit ordered label list; ids follow list order.
    pub fn from_list(labels: &[String], base: usize) -> Self {
        let ids = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), base + idx))
            .collect();
        Self {
            ids,
            names: labels.to_vec(),
            base,
            forced: false,
        }
    }

    /// Derive from the labels observed across all records: distinct labels,
    /// sorted lexicographically, ascending ids from `base`.
    pub fn from_annotations<'a, I>(annotations: I, base: usize) -> Self
    where
        I: IntoIterator<Item = &'a ImageAnnotation>,
    {
        let mut labels: Vec<String> = annotations
            .into_iter()
            .flat_map(|annotation| annotation.shapes.iter())
            .map(|shape| shape.label.clone())
            .collect();
        labels.sort();
        labels.dedup();
        Self::from_list(&labels, base)
    }

    /// Single forced class: every box resolves to `base` regardless of its
    /// label.
    pub fn single(name: &str, base: usize) -> Self {
        Self {
            ids: HashMap::from([(name.to_string(), base)]),
            names: vec![name.to_string()],
            base,
            forced: true,
        }
    }

    /// Class id for a shape label, honoring forced-single-class mode.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        if self.forced {
            Some(self.base)
        } else {
            self.ids.get(label).copied()
        }
    }

    /// Class names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// (id, name) pairs in id order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(idx, name)| (self.base + idx, name.as_str()))
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
