use atompsp::Pseudopotential;
use crystal::Crystal;
use pspot::CoreRegion;
use types::{PawError, Result};

/// Integer label of every element known to a (self, basis) pair of core
/// regions: the self region's elements in insertion order, then the elements
/// only the basis provides.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementLabels {
    elements: Vec<String>,
}

impl ElementLabels {
    pub fn new(self_region: &CoreRegion, basis_region: &CoreRegion) -> ElementLabels {
        let mut elements: Vec<String> = self_region.get_species().to_vec();

        for sp in basis_region.get_species().iter() {
            if !elements.contains(sp) {
                elements.push(sp.clone());
            }
        }

        ElementLabels { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get_elements(&self) -> &[String] {
        &self.elements
    }

    pub fn get_element(&self, label: usize) -> &str {
        &self.elements[label]
    }

    pub fn get_label(&self, element: &str) -> Result<i32> {
        self.elements
            .iter()
            .position(|e| e == element)
            .map(|i| i as i32)
            .ok_or_else(|| PawError::MissingElement(element.to_string()))
    }

    /// Label of every site of `crystal`, in site order.
    pub fn labels_of(&self, crystal: &Crystal) -> Result<Vec<i32>> {
        crystal
            .get_atom_species()
            .iter()
            .map(|sp| self.get_label(sp))
            .collect()
    }
}

/// Dataset of `element`, taken from the self region when it has one.
pub(crate) fn lookup_psp<'a>(
    element: &str,
    self_region: &'a CoreRegion,
    basis_region: &'a CoreRegion,
) -> Result<&'a Pseudopotential> {
    if self_region.contains(element) {
        self_region.get_psp(element)
    } else {
        basis_region.get_psp(element)
    }
}
