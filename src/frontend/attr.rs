//! Attribution for the bundled frontend.
//!
//! Only type *names* are resolved: every type reference in a unit must name
//! a type variable or local type in scope, a member type of an enclosing type
//! or of its direct supertypes, a type of the source set, an imported type, or
//! a type known to the class index. Expression typing and member lookup are out
//! of scope. Source level gating rejects syntax newer than `-source`.

use rustc_hash::{
    FxHashMap,
    FxHashSet,
};
use tree_sitter::{
    Node,
    Tree,
};

use super::options::CompilerOptions;
use super::symbols::{
    ClassIndex,
    JAVA_LANG,
};
use super::syntax::position;
use crate::diagnostic::{
    codes,
    Diagnostic,
};

/// Clauses naming the supertypes of a type declaration.
const SUPERTYPE_CLAUSES: [&str; 3] = ["superclass", "super_interfaces", "extends_interfaces"];

/// Nodes whose direct children may declare local types.
const LOCAL_SCOPES: [&str; 3] = ["block", "constructor_body", "switch_block_statement_group"];

const TYPE_DECLARATIONS: [&str; 5] = [
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Language features gated on `-source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Lambda,
    MethodReference,
    DefaultMethod,
    Diamond,
    TryWithResources,
}

impl Feature {
    fn min_release(self) -> u32 {
        match self {
            Feature::Lambda | Feature::MethodReference | Feature::DefaultMethod => 8,
            Feature::Diamond | Feature::TryWithResources => 7,
        }
    }

    fn code(self) -> &'static str {
        match self {
            Feature::Lambda => codes::LAMBDA_NOT_SUPPORTED,
            Feature::MethodReference => codes::METHOD_REFERENCES_NOT_SUPPORTED,
            Feature::DefaultMethod => codes::DEFAULT_METHODS_NOT_SUPPORTED,
            Feature::Diamond => codes::DIAMOND_NOT_SUPPORTED,
            Feature::TryWithResources => codes::TRY_WITH_RESOURCES_NOT_SUPPORTED,
        }
    }

    /// Name and verb as they read in the message.
    fn describe(self) -> (&'static str, &'static str) {
        match self {
            Feature::Lambda => ("lambda expressions", "are"),
            Feature::MethodReference => ("method references", "are"),
            Feature::DefaultMethod => ("default methods", "are"),
            Feature::Diamond => ("diamond operator", "is"),
            Feature::TryWithResources => ("try-with-resources", "is"),
        }
    }
}

fn node_text<'t>(node: &Node, text: &'t str) -> &'t str {
    &text[node.start_byte()..node.end_byte()]
}

/// Qualified names with whitespace and comments dropped, e.g. `java . util`.
fn dotted_name(node: &Node, text: &str) -> String {
    node_text(node, text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.child_count()).filter_map(move |i| node.child(i))
}

fn has_child_kind(node: &Node, kind: &str) -> bool {
    children(*node).any(|child| child.kind() == kind)
}

/// Package named by the unit's `package` clause, or `""`.
pub fn package_name(tree: &Tree, text: &str) -> String {
    children(tree.root_node())
        .find(|node| node.kind() == "package_declaration")
        .and_then(|decl| {
            children(decl).find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
        })
        .map(|name| dotted_name(&name, text))
        .unwrap_or_default()
}

/// A type declared by a unit: its qualified name, whether it is top level,
/// and the node of its simple name.
pub struct DeclaredType<'t> {
    pub qualified: String,
    pub simple: String,
    pub top_level: bool,
    pub name: Node<'t>,
}

/// Top level and member types declared in a unit. Local classes are not
/// members and are skipped.
pub fn declared_types<'t>(tree: &'t Tree, text: &str) -> Vec<DeclaredType<'t>> {
    let package = package_name(tree, text);
    let mut declared = Vec::new();

    for node in children(tree.root_node()) {
        collect_declared(node, &package, true, text, &mut declared);
    }

    declared
}

fn collect_declared<'t>(
    node: Node<'t>,
    outer: &str,
    top_level: bool,
    text: &str,
    declared: &mut Vec<DeclaredType<'t>>,
) {
    if !TYPE_DECLARATIONS.contains(&node.kind()) {
        return;
    }
    let Some(name) = node.child_by_field_name("name") else {
        return;
    };

    let simple = node_text(&name, text).to_string();
    let qualified = if outer.is_empty() {
        simple.clone()
    } else {
        format!("{outer}.{simple}")
    };

    if let Some(body) = node.child_by_field_name("body") {
        let mut bodies = vec![body];
        while let Some(body) = bodies.pop() {
            for member in children(body) {
                if member.kind() == "enum_body_declarations" {
                    bodies.push(member);
                } else {
                    collect_declared(member, &qualified, false, text, declared);
                }
            }
        }
    }

    declared.push(DeclaredType {
        qualified,
        simple,
        top_level,
        name,
    });
}

/// Registers the unit's types in `sources`, returning a diagnostic for every
/// top level type that is already declared.
pub fn enter_unit(tree: &Tree, text: &str, sources: &mut ClassIndex) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut declared = declared_types(tree, text);
    // Members are collected before their owner; report in source order.
    declared.sort_by_key(|declared| declared.name.start_byte());

    for declared in declared {
        if declared.top_level && sources.contains_class(&declared.qualified) {
            diagnostics.push(
                Diagnostic::error(
                    codes::DUPLICATE_CLASS,
                    format!("duplicate class: {}", declared.qualified),
                )
                .at(position(&declared.name)),
            );
            continue;
        }
        sources.add_class(&declared.qualified);
    }

    diagnostics
}

/// Checks one parsed unit against the classpath and the source set.
pub struct UnitChecker<'a> {
    text: &'a str,
    options: CompilerOptions,
    classpath: &'a ClassIndex,
    sources: &'a ClassIndex,
    package: String,
    /// Simple to qualified name of every top level and member type.
    unit_types: FxHashMap<String, String>,
    single_imports: FxHashMap<String, String>,
    on_demand: Vec<String>,
    /// Type parameters, member types and local types, innermost last.
    scopes: Vec<FxHashSet<String>>,
    /// Qualified direct supertypes of each enclosing type declaration.
    supertypes: Vec<Vec<String>>,
    enclosing: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> UnitChecker<'a> {
    pub fn new(
        text: &'a str,
        options: CompilerOptions,
        classpath: &'a ClassIndex,
        sources: &'a ClassIndex,
    ) -> Self {
        Self {
            text,
            options,
            classpath,
            sources,
            package: String::new(),
            unit_types: FxHashMap::default(),
            single_imports: FxHashMap::default(),
            on_demand: Vec::new(),
            scopes: Vec::new(),
            supertypes: Vec::new(),
            enclosing: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn check(mut self, tree: &Tree) -> Vec<Diagnostic> {
        let root = tree.root_node();

        self.package = package_name(tree, self.text);
        self.unit_types = declared_types(tree, self.text)
            .into_iter()
            .map(|declared| (declared.simple, declared.qualified))
            .collect();

        for node in children(root) {
            if node.kind() == "import_declaration" {
                self.check_import(node);
            }
        }

        for node in children(root) {
            if !matches!(node.kind(), "import_declaration" | "package_declaration") {
                self.visit(node);
            }
        }

        self.diagnostics
    }

    fn class_exists(&self, qualified: &str) -> bool {
        self.classpath.contains_class(qualified) || self.sources.contains_class(qualified)
    }

    fn package_exists(&self, package: &str) -> bool {
        self.classpath.contains_package(package) || self.sources.contains_package(package)
    }

    fn member_exists(&self, package: &str, simple: &str) -> bool {
        self.classpath.contains_member(package, simple)
            || self.sources.contains_member(package, simple)
    }

    fn check_import(&mut self, node: Node) {
        let Some(name) = children(node)
            .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
        else {
            return;
        };
        let qualified = dotted_name(&name, self.text);
        let is_static = has_child_kind(&node, "static");
        let on_demand = has_child_kind(&node, "asterisk");

        match (is_static, on_demand) {
            (false, true) => {
                if self.package_exists(&qualified) || self.class_exists(&qualified) {
                    self.on_demand.push(qualified);
                } else {
                    self.report_missing_package(&name, &qualified);
                }
            }
            (false, false) => {
                let (package, simple) = qualified
                    .rsplit_once('.')
                    .unwrap_or(("", qualified.as_str()));
                if !self.class_exists(&qualified) {
                    self.report_missing_class(&name, package, simple);
                }
                self.single_imports
                    .insert(simple.to_string(), qualified.clone());
            }
            (true, true) => {
                if !self.class_exists(&qualified) {
                    let (package, simple) = qualified
                        .rsplit_once('.')
                        .unwrap_or(("", qualified.as_str()));
                    self.report_missing_class(&name, package, simple);
                }
            }
            (true, false) => {
                let owner = qualified.rsplit_once('.').map(|(owner, _)| owner).unwrap_or("");
                if !self.class_exists(owner) {
                    let (package, simple) = owner.rsplit_once('.').unwrap_or(("", owner));
                    self.report_missing_class(&name, package, simple);
                }
            }
        }
    }

    fn report_missing_class(&mut self, node: &Node, package: &str, simple: &str) {
        if package.is_empty() || self.package_exists(package) {
            let location = if package.is_empty() {
                "unnamed package".to_string()
            } else {
                format!("package {package}")
            };
            self.cant_resolve(node, simple, &location);
        } else {
            self.report_missing_package(node, package);
        }
    }

    fn report_missing_package(&mut self, node: &Node, package: &str) {
        self.diagnostics.push(
            Diagnostic::error(
                codes::DOESNT_EXIST,
                format!("package {package} does not exist"),
            )
            .at(position(node)),
        );
    }

    fn cant_resolve(&mut self, node: &Node, symbol: &str, location: &str) {
        self.diagnostics.push(
            Diagnostic::error(
                codes::CANT_RESOLVE_LOCATION,
                format!("cannot find symbol\n  symbol:   class {symbol}\n  location: {location}"),
            )
            .at(position(node)),
        );
    }

    fn current_location(&self) -> String {
        match self.enclosing.last() {
            Some(owner) => format!("class {owner}"),
            None if self.package.is_empty() => "unnamed package".to_string(),
            None => format!("package {}", self.package),
        }
    }

    fn is_visible(&self, name: &str) -> bool {
        if name == "var" && self.options.source >= 10 {
            return true;
        }

        self.scopes.iter().any(|scope| scope.contains(name))
            || self.is_inherited_member(name)
            || self.unit_types.contains_key(name)
            || self.single_imports.contains_key(name)
            || self.member_exists(&self.package, name)
            || self.on_demand.iter().any(|package| self.member_exists(package, name))
            || self.member_exists(JAVA_LANG, name)
    }

    fn is_inherited_member(&self, name: &str) -> bool {
        self.supertypes
            .iter()
            .flatten()
            .any(|owner| self.class_exists(&format!("{owner}.{name}")))
    }

    /// Qualified name a simple type name refers to at unit level.
    fn resolve_simple(&self, name: &str) -> Option<String> {
        if let Some(qualified) = self
            .unit_types
            .get(name)
            .or_else(|| self.single_imports.get(name))
        {
            return Some(qualified.clone());
        }

        std::iter::once(self.package.as_str())
            .chain(self.on_demand.iter().map(String::as_str))
            .chain(std::iter::once(JAVA_LANG))
            .find(|package| self.member_exists(package, name))
            .map(|package| {
                if package.is_empty() {
                    name.to_string()
                } else {
                    format!("{package}.{name}")
                }
            })
    }

    fn resolve_type(&self, node: &Node) -> Option<String> {
        let name = dotted_name(node, self.text);
        if node.kind() != "scoped_type_identifier" {
            return self.resolve_simple(&name);
        }
        if self.class_exists(&name) {
            return Some(name);
        }

        let (first, rest) = name.split_once('.')?;
        self.resolve_simple(first).map(|outer| format!("{outer}.{rest}"))
    }

    /// Direct supertypes that resolve to a known class. Unresolved ones are
    /// reported when the clause itself is visited.
    fn supertypes_of(&self, declaration: &Node) -> Vec<String> {
        let mut references = Vec::new();

        let clauses = children(*declaration).filter(|child| SUPERTYPE_CLAUSES.contains(&child.kind()));
        for clause in clauses {
            let mut stack = vec![clause];
            while let Some(current) = stack.pop() {
                match current.kind() {
                    "type_identifier" | "scoped_type_identifier" => references.push(current),
                    "generic_type" => references.extend(children(current).find(|child| {
                        matches!(child.kind(), "type_identifier" | "scoped_type_identifier")
                    })),
                    _ => stack.extend(children(current)),
                }
            }
        }

        references
            .iter()
            .filter_map(|reference| self.resolve_type(reference))
            .collect()
    }

    fn member_types(&self, declaration: &Node) -> FxHashSet<String> {
        let Some(body) = declaration.child_by_field_name("body") else {
            return FxHashSet::default();
        };

        children(body)
            .flat_map(|member| {
                if member.kind() == "enum_body_declarations" {
                    children(member).collect()
                } else {
                    vec![member]
                }
            })
            .filter_map(|member| self.declared_name(&member))
            .collect()
    }

    fn declared_name(&self, node: &Node) -> Option<String> {
        if !TYPE_DECLARATIONS.contains(&node.kind()) {
            return None;
        }
        node.child_by_field_name("name")
            .map(|name| node_text(&name, self.text).to_string())
    }

    fn type_parameters(&self, node: &Node) -> FxHashSet<String> {
        let Some(parameters) = node.child_by_field_name("type_parameters") else {
            return FxHashSet::default();
        };

        children(parameters)
            .filter(|parameter| parameter.kind() == "type_parameter")
            .filter_map(|parameter| {
                children(parameter)
                    .find(|child| matches!(child.kind(), "type_identifier" | "identifier"))
            })
            .map(|name| node_text(&name, self.text).to_string())
            .collect()
    }

    fn visit(&mut self, node: Node) {
        match node.kind() {
            kind if TYPE_DECLARATIONS.contains(&kind) => {
                let owner = node
                    .child_by_field_name("name")
                    .map(|name| node_text(&name, self.text).to_string())
                    .unwrap_or_default();
                let mut scope = self.type_parameters(&node);
                scope.extend(self.member_types(&node));
                let supertypes = self.supertypes_of(&node);

                self.enclosing.push(owner);
                self.scopes.push(scope);
                self.supertypes.push(supertypes);
                self.visit_children(node);
                self.supertypes.pop();
                self.scopes.pop();
                self.enclosing.pop();
            }
            kind if LOCAL_SCOPES.contains(&kind) => {
                let locals: FxHashSet<String> = children(node)
                    .filter_map(|statement| self.declared_name(&statement))
                    .collect();

                self.scopes.push(locals);
                self.visit_children(node);
                self.scopes.pop();
            }
            "method_declaration" | "constructor_declaration" => {
                if node.kind() == "method_declaration" {
                    self.check_default_method(&node);
                }
                let scope = self.type_parameters(&node);

                self.scopes.push(scope);
                self.visit_children(node);
                self.scopes.pop();
            }
            "type_identifier" => {
                let name = node_text(&node, self.text);
                if !self.is_visible(name) {
                    let location = self.current_location();
                    self.cant_resolve(&node, name, &location);
                }
            }
            "scoped_type_identifier" => self.visit_scoped_type(node),
            "lambda_expression" => {
                self.require(&node, Feature::Lambda);
                self.visit_children(node);
            }
            "method_reference" => {
                self.require(&node, Feature::MethodReference);
                self.visit_children(node);
            }
            "try_with_resources_statement" => {
                self.require(&node, Feature::TryWithResources);
                self.visit_children(node);
            }
            "type_arguments" => {
                if node.named_child_count() == 0 && is_instance_creation_type(&node) {
                    self.require(&node, Feature::Diamond);
                }
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        for child in children(node) {
            self.visit(child);
        }
    }

    /// `a.b.C`, `Outer.Inner`, `Map.Entry<K, V>` style references.
    fn visit_scoped_type(&mut self, node: Node) {
        let mut segments = Vec::new();
        let mut type_arguments = Vec::new();
        flatten_scoped(node, &mut segments, &mut type_arguments);

        let names: Vec<&str> = segments
            .iter()
            .map(|segment| node_text(segment, self.text))
            .collect();

        if let Some(first) = names.first() {
            let resolved = self.is_visible(first)
                || (1..names.len()).any(|end| self.class_exists(&names[..=end].join(".")));

            if !resolved {
                self.report_unresolved_qualified(&node, &names);
            }
        }

        for arguments in type_arguments {
            self.visit(arguments);
        }
    }

    fn report_unresolved_qualified(&mut self, node: &Node, names: &[&str]) {
        let known_package = (1..names.len())
            .rev()
            .find(|&len| self.package_exists(&names[..len].join(".")));

        match known_package {
            Some(len) => {
                let location = format!("package {}", names[..len].join("."));
                self.cant_resolve(node, names[len], &location);
            }
            None => {
                let package = names[..names.len() - 1].join(".");
                self.report_missing_package(node, &package);
            }
        }
    }

    fn check_default_method(&mut self, node: &Node) {
        let in_interface = node
            .parent()
            .map(|parent| parent.kind() == "interface_body")
            .unwrap_or(false);
        let is_default = children(*node)
            .filter(|child| child.kind() == "modifiers")
            .any(|modifiers| has_child_kind(&modifiers, "default"));

        if in_interface && is_default {
            self.require(node, Feature::DefaultMethod);
        }
    }

    fn require(&mut self, node: &Node, feature: Feature) {
        let source = self.options.source;
        let release = feature.min_release();
        if source >= release {
            return;
        }

        let (name, verb) = feature.describe();
        self.diagnostics.push(
            Diagnostic::error(
                feature.code(),
                format!(
                    "{name} {verb} not supported in -source {source}\n  (use -source {release} or higher to enable {name})"
                ),
            )
            .at(position(node)),
        );
    }
}

fn is_instance_creation_type(type_arguments: &Node) -> bool {
    type_arguments
        .parent()
        .filter(|parent| parent.kind() == "generic_type")
        .and_then(|generic| generic.parent())
        .map(|owner| owner.kind() == "object_creation_expression")
        .unwrap_or(false)
}

fn flatten_scoped<'t>(node: Node<'t>, segments: &mut Vec<Node<'t>>, arguments: &mut Vec<Node<'t>>) {
    for child in children(node) {
        match child.kind() {
            "type_identifier" => segments.push(child),
            "scoped_type_identifier" => flatten_scoped(child, segments, arguments),
            "generic_type" => {
                for part in children(child) {
                    match part.kind() {
                        "type_identifier" => segments.push(part),
                        "scoped_type_identifier" => flatten_scoped(part, segments, arguments),
                        "type_arguments" => arguments.push(part),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}
