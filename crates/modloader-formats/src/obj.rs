//! Wavefront mesh (`.obj`) parser.
//!
//! Reads vertex attributes and faces into a triangle [`Mesh`]. Polygons are
//! fan-triangulated. `mtllib` and `usemtl` reference material libraries and
//! materials that must already be registered; a reference that cannot be
//! resolved yields a material group with no material rather than an error.

use crate::text::{Command, ParseError, SourceFile, commands, parse_f32};
use modloader_core::asset::{Asset, AssetData, Corner, MaterialGroup, Mesh, material_path};
use modloader_core::asset_registry::AssetRegistry;

/// Parse the mesh `text` read from `file` into a single mesh asset.
pub fn parse_mesh(
    text: &str,
    file: &SourceFile,
    assets: &AssetRegistry,
) -> Result<Asset, ParseError> {
    let mut mesh = Mesh::default();
    let mut libraries: Vec<String> = Vec::new();
    let mut group: Option<MaterialGroup> = None;

    for command in commands(text) {
        if command.args.is_empty() {
            continue;
        }

        match command.keyword.as_str() {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&command, 3)?;
                mesh.positions.push([x, y, z]);
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&command, 1)?;
                mesh.tex_coords.push([u, v]);
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&command, 3)?;
                mesh.normals.push([x, y, z]);
            }
            "f" => {
                if command.args.len() < 3 {
                    return Err(ParseError::format(
                        command.line,
                        format!("face needs at least 3 vertices, found {}", command.args.len()),
                    ));
                }
                let corners = command
                    .args
                    .iter()
                    .map(|token| parse_corner(token, &mesh, command.line))
                    .collect::<Result<Vec<_>, ParseError>>()?;

                let group = group.get_or_insert_with(|| MaterialGroup {
                    start: mesh.triangles.len(),
                    count: 0,
                    material: None,
                });
                for i in 1..corners.len() - 1 {
                    mesh.triangles.push([corners[0], corners[i], corners[i + 1]]);
                    group.count += 1;
                }
            }
            "mtllib" => {
                for reference in &command.args {
                    let path = file.resolve_relative(reference);
                    match assets.find_by_source_path(&path) {
                        Some(asset) if asset.as_material_library().is_some() => {
                            libraries.push(asset.logical_path.clone());
                        }
                        _ => log::debug!(
                            "{}:{}: material library '{}' not loaded",
                            file.logical_path,
                            command.line,
                            path.display()
                        ),
                    }
                }
            }
            "usemtl" => {
                let name = command.args[0];
                let material = libraries
                    .iter()
                    .find_map(|lib| assets.material_at(&material_path(lib, name)))
                    .map(|(guid, _)| guid);
                if material.is_none() {
                    log::debug!(
                        "{}:{}: material '{name}' not found",
                        file.logical_path,
                        command.line
                    );
                }
                close_group(&mut mesh, group.take());
                group = Some(MaterialGroup {
                    start: mesh.triangles.len(),
                    count: 0,
                    material,
                });
            }
            // Objects, groups, smoothing, comments, unknown.
            _ => {}
        }
    }
    close_group(&mut mesh, group);

    Ok(Asset::new(
        file.guid,
        file.package.as_str(),
        file.source_path.as_path(),
        file.logical_path.as_str(),
        AssetData::Mesh(mesh),
    ))
}

fn close_group(mesh: &mut Mesh, group: Option<MaterialGroup>) {
    if let Some(group) = group
        && group.count > 0
    {
        mesh.material_groups.push(group);
    }
}

/// Parse up to `N` floats, requiring at least `required`. Missing trailing
/// components are zero; extra components are ignored.
fn parse_floats<const N: usize>(
    command: &Command<'_>,
    required: usize,
) -> Result<[f32; N], ParseError> {
    if command.args.len() < required {
        return Err(ParseError::format(
            command.line,
            format!(
                "`{}` needs {required} components, found {}",
                command.keyword,
                command.args.len()
            ),
        ));
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(&command.args) {
        *slot = parse_f32(token, command.line)?;
    }
    Ok(out)
}

/// Parse a face corner (`p`, `p/t`, `p//n` or `p/t/n`).
fn parse_corner(token: &str, mesh: &Mesh, line: usize) -> Result<Corner, ParseError> {
    let mut parts = token.split('/');
    let position = match parts.next() {
        Some(p) if !p.is_empty() => resolve_index(p, mesh.positions.len(), line)?,
        _ => return Err(ParseError::format(line, format!("bad face vertex '{token}'"))),
    };
    let tex_coord = match parts.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, mesh.tex_coords.len(), line)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, mesh.normals.len(), line)?),
        _ => None,
    };
    if parts.next().is_some() {
        return Err(ParseError::format(line, format!("bad face vertex '{token}'")));
    }
    Ok(Corner {
        position,
        tex_coord,
        normal,
    })
}

/// Convert a 1-based (or negative, end-relative) index into a 0-based one.
fn resolve_index(token: &str, len: usize, line: usize) -> Result<u32, ParseError> {
    let raw: i64 = token
        .parse()
        .map_err(|_| ParseError::format(line, format!("expected an index, found '{token}'")))?;
    let index = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || index < 0 || index >= len as i64 {
        return Err(ParseError::format(
            line,
            format!("index {raw} out of range ({len} defined)"),
        ));
    }
    Ok(index as u32)
}
