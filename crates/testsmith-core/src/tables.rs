//! Dialect tables: container shapes, default literals, mock matchers.
//!
//! All three tables are keyed by canonical type name and looked up by exact
//! match first. The shape table is ordered: when several container types
//! apply to a class structurally, the one declared first wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder for one synthesized element literal inside a shape.
pub const VAL_PLACEHOLDER: &str = "<VAL>";
/// Placeholder for the `<A,B>` type-argument list inside a shape.
pub const TYPES_PLACEHOLDER: &str = "<TYPES>";
/// Matcher-table key that applies to every type of a dialect.
pub const ANY_TYPE: &str = "*";

// ============================================================================
// Container Shapes
// ============================================================================

/// A container type and the literal text that builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub shape: String,
}

/// Ordered mapping from container type to literal shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeTable {
    entries: Vec<ShapeEntry>,
}

impl ShapeTable {
    pub fn new(entries: Vec<ShapeEntry>) -> Self {
        ShapeTable { entries }
    }

    /// Groovy literals for the `java.util` collection family.
    pub fn groovy_defaults() -> Self {
        const SHAPES: [(&str, &str); 19] = [
            ("java.util.Collection", "[<VAL>]"),
            ("java.util.Deque", "new LinkedList([<VAL>])"),
            ("java.util.List", "[<VAL>]"),
            ("java.util.Map", "[<VAL>:<VAL>]"),
            ("java.util.NavigableMap", "new java.util.TreeMap([<VAL>:<VAL>])"),
            ("java.util.NavigableSet", "new java.util.TreeSet([<VAL>])"),
            ("java.util.Queue", "new java.util.LinkedList<TYPES>([<VAL>])"),
            ("java.util.RandomAccess", "new java.util.Vector([<VAL>])"),
            ("java.util.Set", "[<VAL>] as java.util.Set<TYPES>"),
            ("java.util.SortedSet", "[<VAL>] as java.util.SortedSet<TYPES>"),
            ("java.util.LinkedList", "new java.util.LinkedList<TYPES>([<VAL>])"),
            ("java.util.ArrayList", "[<VAL>]"),
            ("java.util.HashMap", "[<VAL>:<VAL>]"),
            ("java.util.TreeMap", "new java.util.TreeMap<TYPES>([<VAL>:<VAL>])"),
            ("java.util.Vector", "new java.util.Vector([<VAL>])"),
            ("java.util.HashSet", "[<VAL>] as java.util.HashSet"),
            ("java.util.Stack", "new java.util.Stack<TYPES>(){{push(<VAL>)}}"),
            ("java.util.LinkedHashMap", "[<VAL>:<VAL>]"),
            ("java.util.TreeSet", "[<VAL>] as java.util.TreeSet"),
        ];
        ShapeTable::new(
            SHAPES
                .iter()
                .map(|(t, s)| ShapeEntry {
                    type_name: t.to_string(),
                    shape: s.to_string(),
                })
                .collect(),
        )
    }

    /// Shape registered for exactly `type_name`.
    pub fn exact(&self, type_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.type_name == type_name)
            .map(|e| e.shape.as_str())
    }

    /// First entry, in declaration order, whose type is one of `ancestors`.
    pub fn first_structural(&self, ancestors: &[String]) -> Option<&ShapeEntry> {
        self.entries
            .iter()
            .find(|e| ancestors.iter().any(|a| *a == e.type_name))
    }

    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }
}

// ============================================================================
// Default Literals
// ============================================================================

/// Literal used for a type when no shape applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultValueTable {
    values: BTreeMap<String, String>,
}

impl DefaultValueTable {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        DefaultValueTable { values }
    }

    /// Groovy literals for primitives, wrappers, numbers and time types.
    pub fn groovy_defaults() -> Self {
        const VALUES: [(&str, &str); 28] = [
            ("byte", "(byte)0"),
            ("short", "(short)0"),
            ("int", "0"),
            ("long", "0L"),
            ("float", "0F"),
            ("double", "0D"),
            ("char", "(char)'a'"),
            ("boolean", "true"),
            ("java.lang.Byte", "java.lang.Byte.parseByte(\"0\")"),
            ("java.lang.Short", "(short)0"),
            ("java.lang.Integer", "0"),
            ("java.lang.Long", "1L"),
            ("java.lang.Float", "1.1F"),
            ("java.lang.Double", "0d"),
            ("java.lang.Character", "'a' as Character"),
            ("java.lang.Boolean", "Boolean.TRUE"),
            ("java.math.BigDecimal", "java.math.BigDecimal.ZERO"),
            ("java.math.BigInteger", "0g"),
            ("java.util.Date", "new java.util.Date()"),
            ("java.util.Calendar", "java.util.Calendar.getInstance()"),
            (
                "java.sql.Timestamp",
                "new java.sql.Timestamp(java.lang.System.currentTimeMillis())",
            ),
            ("java.time.LocalDate", "java.time.LocalDate.now()"),
            ("java.time.LocalDateTime", "java.time.LocalDateTime.now()"),
            ("java.time.LocalTime", "java.time.LocalTime.now()"),
            (
                "java.time.Instant",
                "java.time.LocalDateTime.now().toInstant(java.time.ZoneOffset.UTC)",
            ),
            ("java.lang.Class", "Class.forName(\"\")"),
            ("java.lang.Number", "0"),
            ("java.util.UUID", "java.util.UUID.randomUUID()"),
        ];
        DefaultValueTable::new(
            VALUES
                .iter()
                .map(|(t, v)| (t.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.values.get(type_name).map(String::as_str)
    }
}

// ============================================================================
// Mock Matchers
// ============================================================================

/// "Match anything" argument expressions per test dialect and type.
///
/// Keyed `dialect -> type -> matcher`; the `*` type key is the dialect-wide
/// fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatcherTable {
    dialects: BTreeMap<String, BTreeMap<String, String>>,
}

impl MatcherTable {
    pub fn new(dialects: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        MatcherTable { dialects }
    }

    /// Spock's `_` for Groovy, Mockito argument matchers for Java.
    pub fn with_defaults() -> Self {
        let mut dialects = BTreeMap::new();

        let mut groovy = BTreeMap::new();
        groovy.insert(ANY_TYPE.to_string(), "_".to_string());
        dialects.insert("groovy".to_string(), groovy);

        let java: BTreeMap<String, String> = [
            (ANY_TYPE, "any()"),
            ("byte", "anyByte()"),
            ("short", "anyShort()"),
            ("int", "anyInt()"),
            ("long", "anyLong()"),
            ("float", "anyFloat()"),
            ("double", "anyDouble()"),
            ("char", "anyChar()"),
            ("boolean", "anyBoolean()"),
            ("java.lang.String", "anyString()"),
        ]
        .iter()
        .map(|(t, m)| (t.to_string(), m.to_string()))
        .collect();
        dialects.insert("java".to_string(), java);

        MatcherTable { dialects }
    }

    /// Matcher for `type_name` in `dialect`, falling back to the dialect's
    /// `*` entry. Dialect names compare case-insensitively.
    pub fn matcher(&self, dialect: &str, type_name: &str) -> Option<&str> {
        let table = self.dialects.get(&dialect.to_ascii_lowercase())?;
        table
            .get(type_name)
            .or_else(|| table.get(ANY_TYPE))
            .map(String::as_str)
    }
}
