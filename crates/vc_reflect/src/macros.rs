// -----------------------------------------------------------------------------
// Class declaration

/// Implements [`Typed`](crate::info::Typed) for an object type.
///
/// The type must be `Default`, every listed field must be a
/// [`DataKind`](crate::data::DataKind). Fields are written in the listed order.
/// Implement [`Object`](crate::Object) separately, its methods all have defaults.
///
/// With the `auto_register` feature the class is also submitted for
/// [`TypeRegistry::auto_register`](crate::registry::TypeRegistry::auto_register).
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, impl_reflect_object, info::Typed};
///
/// #[derive(Default)]
/// struct Player {
///     name: String,
///     score: u64,
///     target: Option<Box<dyn Object>>,
/// }
///
/// impl_reflect_object!(Player, "Player", [name, score, target]);
/// impl Object for Player {}
///
/// let fields = Player::static_class().fields();
/// assert_eq!(fields[2].data_class(), "ObjectPtr");
/// ```
#[macro_export]
macro_rules! impl_reflect_object {
    ($ty:ty, $name:literal, [$($field:ident),* $(,)?] $(,)?) => {
        impl $crate::info::Typed for $ty {
            fn static_class() -> &'static $crate::info::Class {
                static CLASS: $crate::__macro_exports::OnceLock<$crate::info::Class> =
                    $crate::__macro_exports::OnceLock::new();
                CLASS.get_or_init(|| {
                    $crate::info::Class::object::<$ty>($name)
                        $(.with_field($crate::info::Field::new::<$ty, _>(
                            ::core::stringify!($field),
                            |owner| &owner.$field,
                            |owner| &mut owner.$field,
                        )))*
                })
            }
        }

        $crate::__auto_register!($ty);
    };
}

/// Implements [`Typed`](crate::info::Typed), [`Struct`](crate::Struct) and the
/// [`Data`](crate::data::Data) codec of a value-like struct.
///
/// A struct can then be used as a field of objects and other structs, and as the
/// item of a `Vec`. Its fields are written inline, as children of the field element.
///
/// # Examples
///
/// ```
/// use vc_reflect::{impl_reflect_struct, data::DataKind};
///
/// #[derive(Default)]
/// struct Vec2 {
///     x: f32,
///     y: f32,
/// }
///
/// impl_reflect_struct!(Vec2, "Vec2", [x, y]);
///
/// assert_eq!(<Vec2 as DataKind>::DATA_CLASS, "Vec2");
/// ```
#[macro_export]
macro_rules! impl_reflect_struct {
    ($ty:ty, $name:literal, [$($field:ident),* $(,)?] $(,)?) => {
        impl $crate::info::Typed for $ty {
            fn static_class() -> &'static $crate::info::Class {
                static CLASS: $crate::__macro_exports::OnceLock<$crate::info::Class> =
                    $crate::__macro_exports::OnceLock::new();
                CLASS.get_or_init(|| {
                    $crate::info::Class::structure::<$ty>($name)
                        $(.with_field($crate::info::Field::new::<$ty, _>(
                            ::core::stringify!($field),
                            |owner| &owner.$field,
                            |owner| &mut owner.$field,
                        )))*
                })
            }
        }

        impl $crate::Struct for $ty {}

        impl $crate::data::Data for $ty {
            #[inline]
            fn data_class(&self) -> &'static str {
                $name
            }

            #[inline]
            fn is_compact(&self) -> bool {
                false
            }

            #[inline]
            fn serialize(
                &self,
                writer: &mut dyn $crate::data::ArchiveWriter,
            ) -> ::core::result::Result<(), $crate::persist::ArchiveError> {
                writer.write_fields(self)
            }

            #[inline]
            fn deserialize(
                &mut self,
                reader: &mut dyn $crate::data::ArchiveReader,
            ) -> ::core::result::Result<$crate::data::Advance, $crate::persist::ArchiveError> {
                reader.read_fields(self)?;
                ::core::result::Result::Ok($crate::data::Advance::Consumed)
            }
        }

        impl $crate::data::DataKind for $ty {
            const DATA_CLASS: &'static str = $name;

            #[inline]
            fn register(registry: &mut $crate::registry::TypeRegistry) {
                registry.register::<$ty>();
            }
        }

        impl $crate::data::ArrayItem for $ty {
            #[inline]
            fn write_item(
                &self,
                writer: &mut dyn $crate::data::ArchiveWriter,
            ) -> ::core::result::Result<(), $crate::persist::ArchiveError> {
                writer.write_struct(self)
            }

            #[inline]
            fn allocate_struct<'a>(
                items: &'a mut $crate::__macro_exports::Vec<Self>,
                class: &'static $crate::info::Class,
            ) -> ::core::option::Option<&'a mut dyn $crate::Struct> {
                $crate::__macro_exports::allocate_struct_item(items, class)
            }

            #[inline]
            fn register_item(registry: &mut $crate::registry::TypeRegistry) {
                registry.register::<$ty>();
            }
        }

        $crate::__auto_register!($ty);
    };
}

// -----------------------------------------------------------------------------
// Auto registration

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration::new(
                <$ty as $crate::info::Typed>::static_class
            )
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($ty:ty) => {};
}
