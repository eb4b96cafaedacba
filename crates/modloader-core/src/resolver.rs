//! Dependency validation and processing-order computation.
//!
//! Resolution is two passes over the [`PackageRegistry`]:
//!
//! 1. [`validate`] checks every dependency descriptor of every package and
//!    records faults on the packages whose requirements are not met. No
//!    package is unloaded; invalid packages stay inspectable.
//! 2. [`compute_order`] topologically sorts the valid packages with Kahn's
//!    algorithm, always taking the smallest ready name next, so the same
//!    package set always yields the same order. Packages left over (cycle
//!    members and anything depending on them) are marked invalid and left
//!    out; the rest of the batch is unaffected.

use crate::dependency::Dependency;
use crate::package::{PackageFault, UnresolvedReason};
use crate::registry::PackageRegistry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One unmet dependency found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
    pub package: String,
    pub dependency: Dependency,
    pub reason: UnresolvedReason,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of packages examined.
    pub checked: usize,
    /// Every unmet dependency, in registration order of the owning package.
    pub unresolved: Vec<UnresolvedDependency>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Deterministic linear order in which valid packages are processed.
/// Every package appears after all of its dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingOrder(Vec<String>);

impl ProcessingOrder {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    /// Position of `name` in the order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check every dependency of every package against the registry.
///
/// Previous resolution results are discarded first. Each unmet dependency is
/// recorded on its owning package, which becomes invalid; packages with no
/// unmet dependency become valid. All descriptors are examined, so every
/// problem is reported in one pass.
pub fn validate(registry: &mut PackageRegistry) -> ValidationReport {
    let mut report = ValidationReport::default();

    for package in registry.all() {
        report.checked += 1;
        for dependency in package.dependencies() {
            let reason = match registry.get(dependency.name()) {
                None => Some(UnresolvedReason::Missing),
                Some(installed) if !dependency.is_satisfied_by(installed.version()) => {
                    Some(UnresolvedReason::VersionMismatch {
                        installed: installed.version().clone(),
                    })
                }
                Some(_) => None,
            };
            if let Some(reason) = reason {
                report.unresolved.push(UnresolvedDependency {
                    package: package.name().to_string(),
                    dependency: dependency.clone(),
                    reason,
                });
            }
        }
    }

    for package in registry.all_mut() {
        package.reset_state();
    }
    for unresolved in &report.unresolved {
        if let Some(package) = registry.get_mut(&unresolved.package) {
            package.add_fault(PackageFault::UnresolvedDependency {
                dependency: unresolved.dependency.clone(),
                reason: unresolved.reason.clone(),
            });
        }
    }
    for package in registry.all_mut() {
        package.mark_valid();
        for fault in package.faults() {
            log::warn!("package `{}` is invalid: {fault}", package.name());
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Compute the processing order over the packages currently marked valid.
///
/// Valid packages that depend on a package outside the valid set are
/// invalidated first (transitively). Cycle members are marked
/// `CyclicDependency`; packages blocked only by a cycle are marked with an
/// unresolved `DependencyInvalid` dependency. Neither appears in the result.
pub fn compute_order(registry: &mut PackageRegistry) -> ProcessingOrder {
    invalidate_dependents_of_invalid(registry);

    // Graph over valid packages: dependency names per package, deduplicated.
    let mut requires: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for package in registry.all().filter(|p| p.is_valid()) {
        let deps = package
            .dependencies()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        requires.insert(package.name().to_string(), deps);
    }

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for (name, deps) in &requires {
        in_degree.insert(name.as_str(), deps.len());
        for dep in deps {
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
        }
    }

    // Ready set ordered by name: the tie-break between independent packages.
    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&name, _)| name)
        .collect();

    let mut order: Vec<String> = Vec::with_capacity(requires.len());
    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        for &dependent in dependents.get(name).into_iter().flatten() {
            if let Some(deg) = in_degree.get_mut(dependent) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    // Anything not ordered is in a cycle or depends on one.
    if order.len() < requires.len() {
        let ordered: HashSet<&str> = order.iter().map(String::as_str).collect();
        let remaining: BTreeMap<&str, Vec<&str>> = requires
            .iter()
            .filter(|(name, _)| !ordered.contains(name.as_str()))
            .map(|(name, deps)| {
                let blocked_by = deps
                    .iter()
                    .map(String::as_str)
                    .filter(|d| !ordered.contains(d))
                    .collect();
                (name.as_str(), blocked_by)
            })
            .collect();

        let mut faults: Vec<(String, PackageFault)> = Vec::new();
        for (&name, blocked_by) in &remaining {
            if reaches_itself(name, &remaining) {
                faults.push((name.to_string(), PackageFault::CyclicDependency));
            } else {
                for &dep in blocked_by {
                    faults.push((name.to_string(), dependency_invalid(registry, name, dep)));
                }
            }
        }

        for (name, fault) in faults {
            if let Some(package) = registry.get_mut(&name) {
                log::warn!("package `{name}` excluded from processing: {fault}");
                package.add_fault(fault);
            }
        }
    }

    ProcessingOrder(order)
}

/// Run [`validate`] followed by [`compute_order`].
pub fn resolve(registry: &mut PackageRegistry) -> (ValidationReport, ProcessingOrder) {
    let report = validate(registry);
    let order = compute_order(registry);
    (report, order)
}

/// Mark valid packages whose dependencies are not all valid, until nothing
/// changes.
fn invalidate_dependents_of_invalid(registry: &mut PackageRegistry) {
    loop {
        let valid: HashSet<String> = registry
            .all()
            .filter(|p| p.is_valid())
            .map(|p| p.name().to_string())
            .collect();

        let newly_invalid: Vec<(String, Dependency)> = registry
            .all()
            .filter(|p| p.is_valid())
            .flat_map(|p| {
                p.dependencies()
                    .iter()
                    .filter(|d| !valid.contains(d.name()))
                    .map(|d| (p.name().to_string(), d.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        if newly_invalid.is_empty() {
            return;
        }

        for (name, dependency) in newly_invalid {
            if let Some(package) = registry.get_mut(&name) {
                let fault = PackageFault::UnresolvedDependency {
                    dependency,
                    reason: UnresolvedReason::DependencyInvalid,
                };
                log::warn!("package `{name}` is invalid: {fault}");
                package.add_fault(fault);
            }
        }
    }
}

/// Whether `start` can reach itself through edges of `graph`.
fn reaches_itself(start: &str, graph: &BTreeMap<&str, Vec<&str>>) -> bool {
    let mut stack: Vec<&str> = graph.get(start).cloned().unwrap_or_default();
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if seen.insert(node)
            && let Some(next) = graph.get(node)
        {
            stack.extend(next.iter().copied());
        }
    }
    false
}

fn dependency_invalid(registry: &PackageRegistry, package: &str, dep: &str) -> PackageFault {
    let dependency = registry
        .get(package)
        .and_then(|p| p.dependencies().iter().find(|d| d.name() == dep))
        .cloned();
    match dependency {
        Some(dependency) => PackageFault::UnresolvedDependency {
            dependency,
            reason: UnresolvedReason::DependencyInvalid,
        },
        // Edges are built from the package's own descriptors.
        None => PackageFault::CyclicDependency,
    }
}
