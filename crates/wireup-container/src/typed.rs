//! Typed adapter
//!
//! Derives [`Constructor`] descriptors from plain Rust functions and closures.
//! Input types implement [`Dependency`], return types implement [`Provision`]:
//!
//! | Rust type | Key | Direction |
//! |-----------|-----|-----------|
//! | `T: Component` | `T` | input, output |
//! | [`Many<T>`] | `[T]` | input (every value), output (several contributions) |
//! | [`PerScope<T>`] | `map[scope]T` | input |
//! | [`Scope`] | `Scope` | input (the scope the constructor runs in) |
//! | [`struct_args!`](crate::struct_args) struct | one key per field | input |
//! | [`struct_outputs!`](crate::struct_outputs) struct | one key per field | output |
//! | tuples of outputs, `()`, `Result<R, E>` | keys of `R` | output |
//!
//! ```ignore
//! #[derive(Clone)]
//! struct KvStoreKey { name: String }
//! impl Component for KvStoreKey {}
//!
//! fn provide_kv_store_key(scope: Scope) -> KvStoreKey {
//!     KvStoreKey { name: scope.name().to_string() }
//! }
//! ```

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use wireup_domain::{
    BoxError, Constructor, Error, Location, Result, Scope, Slot, TypeInfo, TypeKey, Value,
};

/// A value the container can produce and inject
pub trait Component: Clone + Send + Sync + 'static {}

macro_rules! impl_component {
    ($($ty:ty),* $(,)?) => {
        $(impl Component for $ty {})*
    };
}

impl_component!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: ?Sized + Send + Sync + 'static> Component for Arc<T> {}

/// Every value of an auto-group type, or several contributions to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Many<T>(pub Vec<T>);

impl<T> Many<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for Many<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<Vec<T>> for Many<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> IntoIterator for Many<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One value of a one-per-scope type for each scope providing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerScope<T>(pub BTreeMap<String, T>);

impl<T> PerScope<T> {
    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.0
    }
}

impl<T> Deref for PerScope<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single-key input
pub trait Injectable: Sized + 'static {
    fn key() -> TypeKey;
    fn from_value(value: Value) -> Result<Self>;
}

impl<T: Component> Injectable for T {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn from_value(value: Value) -> Result<Self> {
        value.into_one()
    }
}

impl<T: Component> Injectable for Many<T> {
    fn key() -> TypeKey {
        TypeKey::sequence(TypeInfo::of::<T>())
    }

    fn from_value(value: Value) -> Result<Self> {
        value.into_many().map(Many)
    }
}

impl<T: Component> Injectable for PerScope<T> {
    fn key() -> TypeKey {
        TypeKey::by_scope(TypeInfo::of::<T>())
    }

    fn from_value(value: Value) -> Result<Self> {
        value.into_by_scope().map(PerScope)
    }
}

impl Injectable for Scope {
    fn key() -> TypeKey {
        TypeKey::of::<Scope>()
    }

    fn from_value(value: Value) -> Result<Self> {
        value.into_one()
    }
}

/// A positional constructor input
pub trait Dependency: Sized + 'static {
    fn slot() -> Slot;
    fn extract(value: Value) -> Result<Self>;
}

impl<T: Injectable> Dependency for T {
    fn slot() -> Slot {
        Slot::Key(T::key())
    }

    fn extract(value: Value) -> Result<Self> {
        T::from_value(value)
    }
}

/// A single-key output
pub trait Producible: Sized + 'static {
    fn key() -> TypeKey;
    fn into_value(self) -> Value;
}

impl<T: Component> Producible for T {
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    fn into_value(self) -> Value {
        Value::one(self)
    }
}

impl<T: Component> Producible for Many<T> {
    fn key() -> TypeKey {
        TypeKey::sequence(TypeInfo::of::<T>())
    }

    fn into_value(self) -> Value {
        Value::many(self.0)
    }
}

/// A positional constructor output
pub trait Output: Sized + 'static {
    fn slot() -> Slot;
    fn into_value(self) -> Value;
}

impl<T: Producible> Output for T {
    fn slot() -> Slot {
        Slot::Key(T::key())
    }

    fn into_value(self) -> Value {
        Producible::into_value(self)
    }
}

/// Everything a constructor returns
pub trait Provision: Sized + 'static {
    fn slots() -> Vec<Slot>;
    fn into_values(self) -> std::result::Result<Vec<Value>, BoxError>;
}

impl<T: Output> Provision for T {
    fn slots() -> Vec<Slot> {
        vec![T::slot()]
    }

    fn into_values(self) -> std::result::Result<Vec<Value>, BoxError> {
        Ok(vec![Output::into_value(self)])
    }
}

impl Provision for () {
    fn slots() -> Vec<Slot> {
        Vec::new()
    }

    fn into_values(self) -> std::result::Result<Vec<Value>, BoxError> {
        Ok(Vec::new())
    }
}

impl<R, E> Provision for std::result::Result<R, E>
where
    R: Provision,
    E: Into<BoxError> + 'static,
{
    fn slots() -> Vec<Slot> {
        R::slots()
    }

    fn into_values(self) -> std::result::Result<Vec<Value>, BoxError> {
        self.map_err(Into::into)?.into_values()
    }
}

macro_rules! impl_provision_tuple {
    ($($out:ident),+) => {
        impl<$($out: Output),+> Provision for ($($out,)+) {
            fn slots() -> Vec<Slot> {
                vec![$($out::slot()),+]
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> std::result::Result<Vec<Value>, BoxError> {
                let ($($out,)+) = self;
                Ok(vec![$(Output::into_value($out)),+])
            }
        }
    };
}

impl_provision_tuple!(O1);
impl_provision_tuple!(O1, O2);
impl_provision_tuple!(O1, O2, O3);
impl_provision_tuple!(O1, O2, O3, O4);
impl_provision_tuple!(O1, O2, O3, O4, O5);
impl_provision_tuple!(O1, O2, O3, O4, O5, O6);
impl_provision_tuple!(O1, O2, O3, O4, O5, O6, O7);
impl_provision_tuple!(O1, O2, O3, O4, O5, O6, O7, O8);

/// Functions and closures usable as constructors
pub trait IntoConstructor<Args> {
    fn into_constructor(self, location: Location) -> Constructor;
}

macro_rules! impl_into_constructor {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> IntoConstructor<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: Provision,
            $($arg: Dependency,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_constructor(self, location: Location) -> Constructor {
                let inputs = vec![$($arg::slot()),*];
                Constructor::new(location, inputs, R::slots(), move |values: Vec<Value>| {
                    let mut values = values.into_iter();
                    $(
                        let $arg = $arg::extract(
                            values
                                .next()
                                .ok_or_else(|| Error::internal("too few input values"))?,
                        )?;
                    )*
                    (self)($($arg),*).into_values()
                })
            }
        }
    };
}

impl_into_constructor!();
impl_into_constructor!(A1);
impl_into_constructor!(A1, A2);
impl_into_constructor!(A1, A2, A3);
impl_into_constructor!(A1, A2, A3, A4);
impl_into_constructor!(A1, A2, A3, A4, A5);
impl_into_constructor!(A1, A2, A3, A4, A5, A6);
impl_into_constructor!(A1, A2, A3, A4, A5, A6, A7);
impl_into_constructor!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Descriptor of a function, located at the caller of the enclosing `#[track_caller]` function
#[track_caller]
pub fn describe<F, Args>(function: F) -> Constructor
where
    F: IntoConstructor<Args>,
{
    function.into_constructor(Location::caller(std::any::type_name::<F>()))
}

/// Descriptor of a ready value
#[track_caller]
pub fn supplied<T: Component>(value: T) -> Constructor {
    let location = Location::caller(format!("supplied {}", TypeInfo::of::<T>().short_name()));
    Constructor::new(
        location,
        Vec::new(),
        vec![Slot::Key(TypeKey::of::<T>())],
        move |_| Ok(vec![Value::one(value.clone())]),
    )
}

/// Declare a struct whose fields are injected as independent inputs.
///
/// ```ignore
/// struct_args! {
///     pub struct ModuleBInputs {
///         pub keeper: KeeperA,
///         pub key: KvStoreKey,
///     }
/// }
/// ```
#[macro_export]
macro_rules! struct_args {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fvis $field: $ty),*
        }

        impl $crate::typed::Dependency for $name {
            fn slot() -> $crate::domain::Slot {
                $crate::domain::Slot::Struct {
                    type_name: ::std::stringify!($name),
                    fields: ::std::vec![$(
                        $crate::domain::Field::new(
                            ::std::stringify!($field),
                            <$ty as $crate::typed::Injectable>::key(),
                        )
                    ),*],
                }
            }

            #[allow(unused_mut)]
            fn extract(value: $crate::domain::Value) -> $crate::domain::Result<Self> {
                let mut fields = value.into_fields()?.into_iter();
                ::std::result::Result::Ok(Self {
                    $($field: <$ty as $crate::typed::Injectable>::from_value(
                        fields.next().ok_or_else(|| {
                            $crate::domain::Error::internal(::std::concat!(
                                "missing field ",
                                ::std::stringify!($field)
                            ))
                        })?,
                    )?),*
                })
            }
        }
    };
}

/// Declare a struct whose fields are produced as independent outputs.
///
/// ```ignore
/// struct_outputs! {
///     pub struct ModuleBOutputs {
///         pub keeper: KeeperB,
///         pub commands: Many<Command>,
///     }
/// }
/// ```
#[macro_export]
macro_rules! struct_outputs {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($fvis:vis $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $($fvis $field: $ty),*
        }

        impl $crate::typed::Output for $name {
            fn slot() -> $crate::domain::Slot {
                $crate::domain::Slot::Struct {
                    type_name: ::std::stringify!($name),
                    fields: ::std::vec![$(
                        $crate::domain::Field::new(
                            ::std::stringify!($field),
                            <$ty as $crate::typed::Producible>::key(),
                        )
                    ),*],
                }
            }

            fn into_value(self) -> $crate::domain::Value {
                $crate::domain::Value::Fields(::std::vec![$(
                    <$ty as $crate::typed::Producible>::into_value(self.$field)
                ),*])
            }
        }
    };
}
