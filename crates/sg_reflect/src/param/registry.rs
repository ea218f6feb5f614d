use core::any::Any;
use core::marker::PhantomData;

use sg_utils::hash::HashMap;

use crate::error::{Error, Result};
use crate::param::{Ownership, Parameter, ParameterProperties};
use crate::value::Value;

// -----------------------------------------------------------------------------
// ParameterRegistry

/// Ordered table of the parameters of one object.
///
/// Iteration follows registration order. Names are unique; the table is
/// built once during construction of the owner and not changed afterwards.
#[derive(Clone, Debug)]
pub struct ParameterRegistry {
    owner: &'static str,
    params: Vec<Parameter>,
    indices: HashMap<&'static str, usize>,
}

impl ParameterRegistry {
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            params: Vec::new(),
            indices: HashMap::default(),
        }
    }

    /// Type name of the owning object, used in error messages.
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Appends `param`.
    ///
    /// Fails with [`Error::DuplicateParameter`] if the name is taken; the
    /// table is left unchanged in that case.
    pub fn add(&mut self, param: Parameter) -> Result<()> {
        if self.indices.contains_key(param.name()) {
            return Err(Error::DuplicateParameter {
                type_name: self.owner,
                name: param.name().into(),
            });
        }
        self.indices.insert(param.name(), self.params.len());
        self.params.push(param);
        Ok(())
    }

    /// Looks up a parameter, failing with [`Error::ParameterNotFound`].
    pub fn get(&self, name: &str) -> Result<&Parameter> {
        self.find(name).ok_or_else(|| Error::ParameterNotFound {
            type_name: self.owner,
            name: name.to_owned(),
        })
    }

    #[inline]
    pub fn find(&self, name: &str) -> Option<&Parameter> {
        self.indices.get(name).map(|&index| &self.params[index])
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Parameters in registration order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params.iter().map(Parameter::name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameters carrying every flag of `properties`, in registration order.
    pub fn filter(&self, properties: ParameterProperties) -> impl Iterator<Item = &Parameter> + '_ {
        self.params.iter().filter(move |p| p.has_property(properties))
    }

    /// Whether any parameter carries every flag of `properties`.
    pub fn has_property(&self, properties: ParameterProperties) -> bool {
        self.params.iter().any(|p| p.has_property(properties))
    }
}

impl<'a> IntoIterator for &'a ParameterRegistry {
    type Item = &'a Parameter;
    type IntoIter = core::slice::Iter<'a, Parameter>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

// -----------------------------------------------------------------------------
// ParamsBuilder

/// Builds the [`ParameterRegistry`] of `T` inside its constructor.
///
/// The first duplicate name is remembered and reported by
/// [`try_build`](Self::try_build); [`build`](Self::build) panics with it.
///
/// # Examples
///
/// ```
/// use sg_reflect::param::{ParameterProperties, ParamsBuilder};
///
/// struct Svm { c: f64, epsilon: f64 }
///
/// let registry = ParamsBuilder::<Svm>::new("Svm")
///     .add("C", |s| &s.c, |s| &mut s.c, ParameterProperties::HYPERPARAMETER)
///     .describe("Regularization constant")
///     .add("epsilon", |s| &s.epsilon, |s| &mut s.epsilon, ParameterProperties::SETTING)
///     .build();
///
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["C", "epsilon"]);
/// assert_eq!(registry.get("C").unwrap().description(), "Regularization constant");
///
/// let duplicate = ParamsBuilder::<Svm>::new("Svm")
///     .add("C", |s| &s.c, |s| &mut s.c, ParameterProperties::empty())
///     .add("C", |s| &s.epsilon, |s| &mut s.epsilon, ParameterProperties::empty())
///     .try_build();
/// assert!(duplicate.is_err());
/// ```
pub struct ParamsBuilder<T> {
    registry: ParameterRegistry,
    error: Option<Error>,
    marker: PhantomData<fn(&T)>,
}

impl<T: Any> ParamsBuilder<T> {
    pub fn new(owner: &'static str) -> Self {
        Self {
            registry: ParameterRegistry::new(owner),
            error: None,
            marker: PhantomData,
        }
    }

    /// Registers an owned field.
    pub fn add<F: Value>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
        properties: ParameterProperties,
    ) -> Self {
        self.push(Parameter::new(name, get, get_mut, properties))
    }

    /// Registers a field whose nested objects are shared rather than owned.
    pub fn add_shared<F: Value>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
        properties: ParameterProperties,
    ) -> Self {
        self.push(Parameter::new(name, get, get_mut, properties).with_ownership(Ownership::Shared))
    }

    /// Sets the description of the most recently added parameter.
    pub fn describe(mut self, description: &'static str) -> Self {
        if let Some(last) = self.registry.params.pop() {
            self.registry.params.push(last.with_description(description));
        }
        self
    }

    fn push(mut self, param: Parameter) -> Self {
        if let Err(err) = self.registry.add(param) {
            self.error.get_or_insert(err);
        }
        self
    }

    pub fn try_build(self) -> Result<ParameterRegistry> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.registry),
        }
    }

    /// # Panics
    ///
    /// Panics if a name was registered twice.
    pub fn build(self) -> ParameterRegistry {
        match self.try_build() {
            Ok(registry) => registry,
            Err(err) => err.handle_error(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
