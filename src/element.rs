use std::borrow::Cow;

/// Canonical byte encoding of a filter element.
///
/// The encoding must be deterministic: `add` and `contains` derive bit
/// positions from it, so two calls on equal elements have to produce the same
/// bytes. Text encodes as its UTF-8 bytes and numbers as their decimal text,
/// so `42u8`, `42u64` and `"42"` all land on the same bits.
pub trait ElementBytes {
    fn element_bytes(&self) -> Cow<'_, [u8]>;
}

impl ElementBytes for str {
    fn element_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl ElementBytes for String {
    fn element_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl ElementBytes for [u8] {
    fn element_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl ElementBytes for Vec<u8> {
    fn element_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<T: ElementBytes + ?Sized> ElementBytes for &T {
    fn element_bytes(&self) -> Cow<'_, [u8]> {
        (**self).element_bytes()
    }
}

macro_rules! impl_element_bytes_as_text {
    ($($t:ty),*) => {
        $(
            impl ElementBytes for $t {
                fn element_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }
            }
        )*
    };
}

impl_element_bytes_as_text!(
    char, bool, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);
