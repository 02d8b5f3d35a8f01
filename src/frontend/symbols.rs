use rustc_hash::FxHashSet;

pub const JAVA_LANG: &str = "java.lang";

/// `java.lang` types that resolve even when no platform archive is readable.
static BOOTSTRAP_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "AssertionError",
    "AutoCloseable",
    "Boolean",
    "Byte",
    "CharSequence",
    "Character",
    "Class",
    "ClassCastException",
    "ClassLoader",
    "ClassNotFoundException",
    "CloneNotSupportedException",
    "Cloneable",
    "Comparable",
    "Deprecated",
    "Double",
    "Enum",
    "Error",
    "Exception",
    "Float",
    "FunctionalInterface",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "Integer",
    "InterruptedException",
    "Iterable",
    "Long",
    "Math",
    "NullPointerException",
    "Number",
    "NumberFormatException",
    "Object",
    "Override",
    "Runnable",
    "Runtime",
    "RuntimeException",
    "SafeVarargs",
    "Short",
    "String",
    "StringBuffer",
    "StringBuilder",
    "SuppressWarnings",
    "System",
    "Thread",
    "ThreadLocal",
    "Throwable",
    "UnsupportedOperationException",
    "Void",
};

/// Fully qualified classes and packages known from classpath locations.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    classes: FxHashSet<String>,
    packages: FxHashSet<String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index that already knows the core `java.lang` types.
    pub fn with_bootstrap() -> Self {
        let mut index = Self::new();
        for name in BOOTSTRAP_TYPES.iter() {
            index.add_class(&format!("{JAVA_LANG}.{name}"));
        }
        index
    }

    pub fn add_class(&mut self, qualified: &str) {
        let mut package = qualified;
        while let Some((parent, _)) = package.rsplit_once('.') {
            if !self.packages.insert(parent.to_string()) {
                break;
            }
            package = parent;
        }
        self.classes.insert(qualified.to_string());
    }

    /// Registers a `.class` entry given relative to its classpath root, such
    /// as `com/acme/Widget.class` or `com/acme/Widget$Part.class`.
    /// Anonymous and local classes are ignored. Returns whether a class was
    /// added.
    pub fn add_class_file(&mut self, relative: &str) -> bool {
        let Some(stem) = relative.strip_suffix(".class") else {
            return false;
        };
        if stem.ends_with("module-info") || stem.ends_with("package-info") {
            return false;
        }

        let binary_name = stem.replace(['/', '\\'], ".");
        let mut segments = binary_name.split('$');
        let Some(outer) = segments.next() else {
            return false;
        };

        let mut qualified = outer.to_string();
        self.add_class(&qualified);
        for member in segments {
            if member.is_empty() || member.starts_with(|c: char| c.is_ascii_digit()) {
                return true;
            }
            qualified.push('.');
            qualified.push_str(member);
            self.add_class(&qualified);
        }

        true
    }

    pub fn contains_class(&self, qualified: &str) -> bool {
        self.classes.contains(qualified)
    }

    pub fn contains_package(&self, package: &str) -> bool {
        package == JAVA_LANG || self.packages.contains(package)
    }

    /// Looks up `simple` inside `package`; the empty string is the unnamed
    /// package.
    pub fn contains_member(&self, package: &str, simple: &str) -> bool {
        if package.is_empty() {
            self.classes.contains(simple)
        } else {
            self.classes.contains(&format!("{package}.{simple}"))
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
