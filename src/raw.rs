//! Types describing the schema of a PLY file and the values stored in it.
//!
//! A PLY header declares a list of elements (e.g. `vertex` or `face`), each
//! with a number of records and an ordered list of properties. Every property
//! is either a single value of one of the ten primitive types or a list of
//! such values (with the length stored right before the values). The header
//! is resolved into the types of this module once, so that decoding the body
//! never has to look at type names again.

use std::{
    fmt,
    io,
    iter::FromIterator,
    ops,
    str::FromStr,
};

use byteorder::{ByteOrder, WriteBytesExt};
use derive_more::{From, Into};
use num_traits::ToPrimitive;
use smallvec::SmallVec;


// ===========================================================================
// ===== Primitive types
// ===========================================================================

/// One of the ten primitive PLY types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ScalarType {
    /// All types, ordered like the variants.
    pub const ALL: [ScalarType; 10] = [
        ScalarType::Char,
        ScalarType::UChar,
        ScalarType::Short,
        ScalarType::UShort,
        ScalarType::Int,
        ScalarType::UInt,
        ScalarType::Long,
        ScalarType::ULong,
        ScalarType::Float,
        ScalarType::Double,
    ];

    /// Returns the type name used when writing a header (e.g. `short` for
    /// `i16`). Reading also accepts the sized names (`int16`, ...), see the
    /// `FromStr` impl.
    pub fn ply_type_name(&self) -> &'static str {
        match *self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Long => "long",
            ScalarType::ULong => "ulong",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Returns `true` if and only if the type is either `float` or `double`.
    pub fn is_floating_point(&self) -> bool {
        *self == ScalarType::Float || *self == ScalarType::Double
    }

    /// Returns `true` if and only if the type is one of `uchar`, `ushort`,
    /// `uint` or `ulong`.
    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            ScalarType::UChar | ScalarType::UShort | ScalarType::UInt | ScalarType::ULong => true,
            _ => false,
        }
    }

    /// Returns `true` if and only if the type is one of `char`, `short`,
    /// `int` or `long`.
    pub fn is_signed_integer(&self) -> bool {
        match self {
            ScalarType::Char | ScalarType::Short | ScalarType::Int | ScalarType::Long => true,
            _ => false,
        }
    }

    /// Returns the number of bytes this type occupies in binary encodings.
    pub fn size(&self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Long | ScalarType::ULong | ScalarType::Double => 8,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.ply_type_name().fmt(f)
    }
}

/// The error emitted when the `FromStr` implementation for `ScalarType` cannot
/// parse the given string.
pub struct ScalarTypeParseError(String);

impl fmt::Display for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for ScalarType {
    type Err = ScalarTypeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "char" | "int8" | "sbyte" => Ok(ScalarType::Char),
            "uchar" | "uint8" | "ubyte" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" => Ok(ScalarType::UInt),
            "long" | "int64" => Ok(ScalarType::Long),
            "ulong" | "uint64" => Ok(ScalarType::ULong),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            other => Err(ScalarTypeParseError(other.to_string())),
        }
    }
}

/// The type of a list length. Only unsigned integers are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListLenType {
    UChar,
    UShort,
    UInt,
    ULong,
}

impl ListLenType {
    pub fn from_scalar_type(ty: ScalarType) -> Option<Self> {
        match ty {
            ScalarType::UChar => Some(ListLenType::UChar),
            ScalarType::UShort => Some(ListLenType::UShort),
            ScalarType::UInt => Some(ListLenType::UInt),
            ScalarType::ULong => Some(ListLenType::ULong),
            _ => None,
        }
    }

    pub fn to_scalar_type(self) -> ScalarType {
        match self {
            ListLenType::UChar => ScalarType::UChar,
            ListLenType::UShort => ScalarType::UShort,
            ListLenType::UInt => ScalarType::UInt,
            ListLenType::ULong => ScalarType::ULong,
        }
    }

    /// The longest list that can be stored with this length type.
    pub fn max_len(self) -> u64 {
        match self {
            ListLenType::UChar => u8::max_value().into(),
            ListLenType::UShort => u16::max_value().into(),
            ListLenType::UInt => u32::max_value().into(),
            ListLenType::ULong => u64::max_value(),
        }
    }
}


mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over the ten Rust types corresponding to [`ScalarType`].
///
/// This is a closed set of types: the supertrait is crate-private, so you
/// can't implement this trait for your own types.
pub trait PlyScalar:
    'static + Copy + fmt::Display + FromStr + ToPrimitive + internal::DoNotImplement
{
    const TY: ScalarType;

    /// Writes the binary representation of `self` with the byte order `E`.
    fn write_binary<E: ByteOrder, W: io::Write>(self, w: &mut W) -> io::Result<()>;
}

macro_rules! impl_ply_scalar {
    ($ty:ident, $variant:ident, single_byte $method:ident) => {
        impl internal::DoNotImplement for $ty {}
        impl PlyScalar for $ty {
            const TY: ScalarType = ScalarType::$variant;
            fn write_binary<E: ByteOrder, W: io::Write>(self, w: &mut W) -> io::Result<()> {
                w.$method(self)
            }
        }
    };
    ($ty:ident, $variant:ident, $method:ident) => {
        impl internal::DoNotImplement for $ty {}
        impl PlyScalar for $ty {
            const TY: ScalarType = ScalarType::$variant;
            fn write_binary<E: ByteOrder, W: io::Write>(self, w: &mut W) -> io::Result<()> {
                w.$method::<E>(self)
            }
        }
    };
}

impl_ply_scalar!(i8,  Char,   single_byte write_i8);
impl_ply_scalar!(u8,  UChar,  single_byte write_u8);
impl_ply_scalar!(i16, Short,  write_i16);
impl_ply_scalar!(u16, UShort, write_u16);
impl_ply_scalar!(i32, Int,    write_i32);
impl_ply_scalar!(u32, UInt,   write_u32);
impl_ply_scalar!(i64, Long,   write_i64);
impl_ply_scalar!(u64, ULong,  write_u64);
impl_ply_scalar!(f32, Float,  write_f32);
impl_ply_scalar!(f64, Double, write_f64);


// ===========================================================================
// ===== Strongly typed index
// ===========================================================================

/// Index of a specific property in the ordered list of properties of one
/// element. Can be used to index a [`PropVec`] or a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
pub struct PropIndex(pub usize);

impl PropIndex {
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// A vector that holds data for each property. Can be indexed by
/// [`PropIndex`].
///
/// This is simply a wrapper around a `Vec` to use strong typing.
#[derive(Debug, Clone, PartialEq, Default, From)]
pub struct PropVec<T>(Vec<T>);

impl<T> PropVec<T> {
    pub fn new() -> Self {
        PropVec(Vec::new())
    }

    /// Iterates over all indices and values.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (PropIndex, &T)> {
        self.0.iter().enumerate().map(|(i, v)| (PropIndex(i), v))
    }
}

impl<T> ops::Index<PropIndex> for PropVec<T> {
    type Output = T;
    fn index(&self, idx: PropIndex) -> &Self::Output {
        &self.0[idx.as_usize()]
    }
}

impl<T> ops::IndexMut<PropIndex> for PropVec<T> {
    fn index_mut(&mut self, idx: PropIndex) -> &mut Self::Output {
        &mut self.0[idx.as_usize()]
    }
}

impl<T> ops::Deref for PropVec<T> {
    type Target = Vec<T>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> ops::DerefMut for PropVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromIterator<T> for PropVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        PropVec(iter.into_iter().collect())
    }
}


// ===========================================================================
// ===== Schema: element and property definitions
// ===========================================================================

/// Element names with a well known meaning. This is purely informational and
/// never changes how an element is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Cell,
    Edge,
    Face,
    Material,
    Vertex,
}

impl ElementKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cell" => Some(ElementKind::Cell),
            "edge" => Some(ElementKind::Edge),
            "face" => Some(ElementKind::Face),
            "material" => Some(ElementKind::Material),
            "vertex" => Some(ElementKind::Vertex),
            _ => None,
        }
    }
}

/// The header definition of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub name: String,

    /// Number of records of this element.
    pub count: u64,

    /// Definitions for all properties of this element, in header order.
    pub property_defs: PropVec<PropertyDef>,
}

impl ElementDef {
    /// Creates a definition without any properties.
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
            property_defs: PropVec::new(),
        }
    }

    pub fn kind(&self) -> Option<ElementKind> {
        ElementKind::from_name(&self.name)
    }

    /// Returns the index of the property with the given name.
    pub fn prop_pos(&self, prop_name: &str) -> Option<PropIndex> {
        self.property_defs.iter()
            .position(|p| p.name == prop_name)
            .map(PropIndex)
    }
}

/// The header definition of one property of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
}

impl PropertyDef {
    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::Scalar(ty),
        }
    }

    pub fn list(name: impl Into<String>, len_type: ListLenType, scalar_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty: PropertyType::List { len_type, scalar_type },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarType),
    List {
        len_type: ListLenType,
        scalar_type: ScalarType,
    }
}

impl PropertyType {
    pub fn len_type(&self) -> Option<ListLenType> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(*len_type),
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        match *self {
            PropertyType::Scalar(scalar_type) => scalar_type,
            PropertyType::List { scalar_type, .. } => scalar_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyType::Scalar(ty) => ty.fmt(f),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "list({}, {})", len_type.to_scalar_type(), scalar_type)
            }
        }
    }
}


// ===========================================================================
// ===== Values
// ===========================================================================

/// One property value of some PLY type.
///
/// The sizes of the smallvecs are choosen so that the inline variant won't
/// inflict a size overhead (on x64). This still means that the most common
/// form of list, the three-tuple `vertex_indices`, will fit inline.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    CharList(SmallVec<[i8; 16]>),
    UCharList(SmallVec<[u8; 16]>),
    ShortList(SmallVec<[i16; 8]>),
    UShortList(SmallVec<[u16; 8]>),
    IntList(SmallVec<[i32; 4]>),
    UIntList(SmallVec<[u32; 4]>),
    LongList(SmallVec<[i64; 2]>),
    ULongList(SmallVec<[u64; 2]>),
    FloatList(SmallVec<[f32; 4]>),
    DoubleList(SmallVec<[f64; 2]>),
}

impl Property {
    /// The type of the single value or of the list's items.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Property::Char(_) | Property::CharList(_) => ScalarType::Char,
            Property::UChar(_) | Property::UCharList(_) => ScalarType::UChar,
            Property::Short(_) | Property::ShortList(_) => ScalarType::Short,
            Property::UShort(_) | Property::UShortList(_) => ScalarType::UShort,
            Property::Int(_) | Property::IntList(_) => ScalarType::Int,
            Property::UInt(_) | Property::UIntList(_) => ScalarType::UInt,
            Property::Long(_) | Property::LongList(_) => ScalarType::Long,
            Property::ULong(_) | Property::ULongList(_) => ScalarType::ULong,
            Property::Float(_) | Property::FloatList(_) => ScalarType::Float,
            Property::Double(_) | Property::DoubleList(_) => ScalarType::Double,
        }
    }

    /// Returns the number of items if this is a list, `None` otherwise.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Property::CharList(l) => Some(l.len()),
            Property::UCharList(l) => Some(l.len()),
            Property::ShortList(l) => Some(l.len()),
            Property::UShortList(l) => Some(l.len()),
            Property::IntList(l) => Some(l.len()),
            Property::UIntList(l) => Some(l.len()),
            Property::LongList(l) => Some(l.len()),
            Property::ULongList(l) => Some(l.len()),
            Property::FloatList(l) => Some(l.len()),
            Property::DoubleList(l) => Some(l.len()),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.list_len().is_some()
    }

    /// Returns `true` if this value can be stored in a property of type `ty`.
    /// The list length type is not checked here.
    pub fn matches(&self, ty: &PropertyType) -> bool {
        self.is_list() == ty.is_list() && self.scalar_type() == ty.scalar_type()
    }

    /// Returns the value as integer, or `None` if the property does not have
    /// an integer type or doesn't fit into `i64` (large `ulong` values).
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Property::Char(v) => Some(v.into()),
            Property::UChar(v) => Some(v.into()),
            Property::Short(v) => Some(v.into()),
            Property::UShort(v) => Some(v.into()),
            Property::Int(v) => Some(v.into()),
            Property::UInt(v) => Some(v.into()),
            Property::Long(v) => Some(v),
            Property::ULong(v) => v.to_i64(),
            _ => None,
        }
    }

    /// Returns the value as unsigned integer, or `None` if the property does
    /// not have an unsigned integer type.
    pub fn as_unsigned_integer(&self) -> Option<u64> {
        match *self {
            Property::UChar(v) => Some(v.into()),
            Property::UShort(v) => Some(v.into()),
            Property::UInt(v) => Some(v.into()),
            Property::ULong(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as float, or `None` if the property does not have a
    /// float type.
    pub fn as_floating_point(&self) -> Option<f64> {
        match *self {
            Property::Float(v) => Some(v.into()),
            Property::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Converts any single numeric value to `f64` (possibly losing precision
    /// for large 64 bit integers). Returns `None` for lists.
    pub fn to_f64(&self) -> Option<f64> {
        match *self {
            Property::Char(v) => v.to_f64(),
            Property::UChar(v) => v.to_f64(),
            Property::Short(v) => v.to_f64(),
            Property::UShort(v) => v.to_f64(),
            Property::Int(v) => v.to_f64(),
            Property::UInt(v) => v.to_f64(),
            Property::Long(v) => v.to_f64(),
            Property::ULong(v) => v.to_f64(),
            Property::Float(v) => v.to_f64(),
            Property::Double(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_property {
    ($ty:ident, $variant:ident, $list_variant:ident) => {
        impl From<$ty> for Property {
            fn from(src: $ty) -> Self {
                Property::$variant(src)
            }
        }

        impl From<Vec<$ty>> for Property {
            fn from(src: Vec<$ty>) -> Self {
                Property::$list_variant(SmallVec::from_vec(src))
            }
        }

        impl From<&[$ty]> for Property {
            fn from(src: &[$ty]) -> Self {
                Property::$list_variant(SmallVec::from_slice(src))
            }
        }
    }
}

impl_from_for_property!(i8,  Char,   CharList);
impl_from_for_property!(u8,  UChar,  UCharList);
impl_from_for_property!(i16, Short,  ShortList);
impl_from_for_property!(u16, UShort, UShortList);
impl_from_for_property!(i32, Int,    IntList);
impl_from_for_property!(u32, UInt,   UIntList);
impl_from_for_property!(i64, Long,   LongList);
impl_from_for_property!(u64, ULong,  ULongList);
impl_from_for_property!(f32, Float,  FloatList);
impl_from_for_property!(f64, Double, DoubleList);


/// All property values of one record, in the order of the property
/// definitions of its element.
#[derive(Debug, Clone, PartialEq, From)]
pub struct Row(PropVec<Property>);

impl Row {
    pub fn new() -> Self {
        Row(PropVec::new())
    }

    pub fn with_capacity(cap: usize) -> Self {
        Row(PropVec(Vec::with_capacity(cap)))
    }

    pub fn push(&mut self, value: impl Into<Property>) {
        self.0.push(value.into());
    }

    pub fn get(&self, idx: PropIndex) -> Option<&Property> {
        self.0.get(idx.as_usize())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }
}

impl From<Vec<Property>> for Row {
    fn from(src: Vec<Property>) -> Self {
        Row(PropVec(src))
    }
}

impl FromIterator<Property> for Row {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

impl ops::Index<PropIndex> for Row {
    type Output = Property;
    fn index(&self, idx: PropIndex) -> &Self::Output {
        &self.0[idx]
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
