/// Declare a struct whose fields map onto columns of a line.
///
/// A field takes its column with `= "start,end[,alignment[,pad]]"` after its
/// type. Fields without one, or with a malformed one, are ignored by the
/// codec. The macro implements [`Record`](crate::Record) and
/// [`FixedValue`](crate::FixedValue), so a declared record can itself be a
/// field of another record. The struct must implement `Default`.
///
/// ```
/// fixedwidth::record! {
///     #[derive(Debug, Default, PartialEq)]
///     pub struct Person {
///         pub first: String = "1,10",
///         pub last: String = "11,20",
///         /// Right-aligned, zero-padded.
///         pub age: u32 = "21,23,right,0",
///         pub note: String,
///     }
/// }
///
/// let person = Person { first: "Ada".into(), last: "Lovelace".into(), age: 36, note: String::new() };
/// let line = fixedwidth::to_vec(&person).unwrap();
/// assert_eq!(line, b"Ada       Lovelace  036");
/// ```
#[macro_export]
macro_rules! record {
    (@tag) => { "" };
    (@tag $tag:literal) => { $tag };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(= $tag:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const NAME: &'static str = ::std::stringify!($name);

            fn fields() -> ::std::vec::Vec<$crate::FieldDecl<Self>> {
                ::std::vec![
                    $(
                        $crate::FieldDecl::<$name>::new::<$ty>(
                            ::std::stringify!($field),
                            $crate::record!(@tag $($tag)?),
                            {
                                fn get(record: &$name) -> &$ty {
                                    &record.$field
                                }
                                get
                            },
                            {
                                fn get_mut(record: &mut $name) -> &mut $ty {
                                    &mut record.$field
                                }
                                get_mut
                            },
                        ),
                    )*
                ]
            }
        }

        impl $crate::FixedValue for $name {
            const KIND: $crate::ValueKind = $crate::ValueKind::Record;
            const TRIM: bool = false;

            fn encode_fixed(
                &self,
                ctx: &$crate::EncodeContext<'_>,
            ) -> ::std::result::Result<::std::borrow::Cow<'_, [u8]>, $crate::ConvertError> {
                $crate::value::encode_nested(self, ctx)
            }

            fn decode_fixed(
                &mut self,
                raw: &$crate::RawValue<'_>,
            ) -> ::std::result::Result<(), $crate::ConvertError> {
                $crate::value::decode_nested(self, raw)
            }
        }
    };
}
