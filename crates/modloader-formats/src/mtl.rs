//! Material library (`.mtl`) parser.
//!
//! The parser keeps a single "current material" slot. `newmtl` finalizes the
//! current material (if any) and starts a new one; property commands modify
//! the current material and fail with [`ParseError::NoActiveAsset`] if there
//! is none. At end of input the current material is finalized as well.
//!
//! Supported commands (keywords are case-insensitive):
//!
//! | Command | Arguments | Effect |
//! |---|---|---|
//! | `newmtl` | name | start a new material |
//! | `Ka` / `Kd` / `Ks` | r g b | ambient / base / specular color, clamped |
//! | `a` | value | opacity, clamped |
//! | `Tr` | value | opacity as `1 - value`, clamped |
//! | `Ns` | value | shininess, clamped |
//! | `illum` | integer | illumination model |
//! | `map_Ka` | path | base map, looked up in the asset registry |
//!
//! Lines with no arguments, comments, and unknown commands are skipped.
//! Parsing is all-or-nothing: on error no material from the file is returned.
//!
//! A name defined twice yields two materials. The first keeps the
//! `library#name` path; later ones get `library#name#ordinal`, where the
//! ordinal is the material's position in the file.

use crate::text::{Command, ParseError, SourceFile, commands, parse_f32, parse_i32};
use modloader_core::asset::{
    Asset, AssetData, Color, IlluminationModel, Material, MaterialLibrary, clamp01,
    material_path,
};
use modloader_core::asset_registry::AssetRegistry;
use modloader_core::id::Guid;
use std::collections::HashSet;

/// Assets produced by one material file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLibrary {
    /// The library itself, keyed by the file's GUID and path.
    pub library: Asset,
    /// Member materials in definition order.
    pub materials: Vec<Asset>,
}

impl ParsedLibrary {
    /// Materials first, then the library, the order they should be
    /// registered in.
    pub fn into_assets(self) -> Vec<Asset> {
        let mut assets = self.materials;
        assets.push(self.library);
        assets
    }
}

/// Parse the material library `text` read from `file`.
///
/// Texture references are resolved relative to the file's directory and
/// looked up in `assets`; a texture that is not registered leaves the slot
/// unset.
pub fn parse_material_library(
    text: &str,
    file: &SourceFile,
    assets: &AssetRegistry,
) -> Result<ParsedLibrary, ParseError> {
    let mut finished: Vec<Material> = Vec::new();
    let mut current: Option<Material> = None;

    for command in commands(text) {
        // Too few arguments to mean anything.
        if command.args.is_empty() {
            continue;
        }

        match command.keyword.as_str() {
            "newmtl" => {
                finished.extend(current.take());
                current = Some(Material::new(command.args[0]));
            }
            "ka" | "kd" | "ks" => {
                let material = active(&mut current, &command)?;
                let color = parse_color(&command)?;
                match command.keyword.as_str() {
                    "ka" => material.ambient = color,
                    "kd" => material.base = color,
                    _ => material.specular = color,
                }
            }
            "a" => {
                let material = active(&mut current, &command)?;
                material.opacity = clamp01(parse_f32(command.args[0], command.line)?);
            }
            "tr" => {
                let material = active(&mut current, &command)?;
                material.opacity = clamp01(1.0 - parse_f32(command.args[0], command.line)?);
            }
            "ns" => {
                let material = active(&mut current, &command)?;
                material.shininess = clamp01(parse_f32(command.args[0], command.line)?);
            }
            "illum" => {
                let material = active(&mut current, &command)?;
                let index = parse_i32(command.args[0], command.line)?;
                material.illumination = IlluminationModel::from_index(index);
            }
            "map_ka" => {
                let material = active(&mut current, &command)?;
                let path = file.resolve_relative(command.args[0]);
                match assets.texture_at(&path) {
                    Some((guid, _)) => material.base_map = Some(guid),
                    None => log::debug!(
                        "{}:{}: texture '{}' not loaded, leaving base map unset",
                        file.logical_path,
                        command.line,
                        path.display()
                    ),
                }
            }
            // Comments and unknown commands.
            _ => {}
        }
    }
    finished.extend(current);

    let mut seen: HashSet<String> = HashSet::new();
    let materials: Vec<Asset> = finished
        .into_iter()
        .enumerate()
        .map(|(ordinal, material)| {
            // A repeated name keeps its own asset under an ordinal-suffixed
            // path; `usemtl` resolves to the first definition.
            let logical = if seen.insert(material.name.clone()) {
                material_path(&file.logical_path, &material.name)
            } else {
                log::warn!(
                    "{}: material '{}' defined more than once",
                    file.logical_path,
                    material.name
                );
                material_path(&file.logical_path, &format!("{}#{ordinal}", material.name))
            };
            Asset::new(
                Guid::derived(file.guid, ordinal as u32),
                file.package.as_str(),
                file.source_path.as_path(),
                logical,
                AssetData::Material(material),
            )
        })
        .collect();

    let library = Asset::new(
        file.guid,
        file.package.as_str(),
        file.source_path.as_path(),
        file.logical_path.as_str(),
        AssetData::MaterialLibrary(MaterialLibrary {
            materials: materials.iter().map(|m| m.guid).collect(),
        }),
    );

    Ok(ParsedLibrary { library, materials })
}

/// The current material, or `NoActiveAsset` if none has been started.
fn active<'m>(
    current: &'m mut Option<Material>,
    command: &Command<'_>,
) -> Result<&'m mut Material, ParseError> {
    current.as_mut().ok_or_else(|| ParseError::NoActiveAsset {
        line: command.line,
        command: command.keyword.clone(),
    })
}

/// Parse exactly three color components, clamping each to `[0, 1]`.
fn parse_color(command: &Command<'_>) -> Result<Color, ParseError> {
    let [r, g, b] = command.args.as_slice() else {
        return Err(ParseError::format(
            command.line,
            format!(
                "`{}` requires 3 color components, found {}",
                command.keyword,
                command.args.len()
            ),
        ));
    };
    Ok(Color::clamped(
        parse_f32(r, command.line)?,
        parse_f32(g, command.line)?,
        parse_f32(b, command.line)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modloader_core::asset::Texture;
    use std::path::Path;

    fn source() -> SourceFile {
        SourceFile::new(
            "core",
            Path::new("/packages/core"),
            Path::new("materials/stone.mtl"),
        )
    }

    fn parse(text: &str) -> Result<ParsedLibrary, ParseError> {
        parse_material_library(text, &source(), &AssetRegistry::new())
    }

    fn material(asset: &Asset) -> &Material {
        asset.as_material().unwrap()
    }

    // -----------------------------------------------------------------------
    // Basic definitions
    // -----------------------------------------------------------------------

    #[test]
    fn single_material_with_base_color() {
        let parsed = parse("newmtl X\nKd 1.0 0.5 0.25\n").unwrap();
        assert_eq!(parsed.materials.len(), 1);

        let asset = &parsed.materials[0];
        assert_eq!(asset.guid, Guid::derived(source().guid, 0));
        assert_eq!(asset.logical_path, "core/materials/stone.mtl#X");
        let m = material(asset);
        assert_eq!(m.name, "X");
        assert_eq!(m.base, Color::new(1.0, 0.5, 0.25));
        assert_eq!(m.opacity, 1.0);
    }

    #[test]
    fn library_lists_members_in_order() {
        let parsed = parse("newmtl a\nnewmtl b\nnewmtl c\n").unwrap();
        let library = parsed.library.as_material_library().unwrap();
        let ids: Vec<Guid> = parsed.materials.iter().map(|m| m.guid).collect();
        assert_eq!(library.materials, ids);
        assert_eq!(parsed.library.guid, source().guid);
        assert_eq!(parsed.library.logical_path, "core/materials/stone.mtl");
        for (ordinal, guid) in ids.iter().enumerate() {
            assert_eq!(*guid, Guid::derived(source().guid, ordinal as u32));
        }
    }

    #[test]
    fn empty_file_yields_empty_library() {
        let parsed = parse("").unwrap();
        assert!(parsed.materials.is_empty());
        assert!(parsed.library.as_material_library().unwrap().materials.is_empty());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let parsed = parse("NEWMTL x\nkD 0 1 0\nKS 0.5 0.5 0.5\n").unwrap();
        let m = material(&parsed.materials[0]);
        assert_eq!(m.base, Color::new(0.0, 1.0, 0.0));
        assert_eq!(m.specular, Color::gray(0.5));
    }

    #[test]
    fn crlf_and_cr_line_endings() {
        let parsed = parse("newmtl a\r\nKa 0.1 0.1 0.1\rnewmtl b").unwrap();
        assert_eq!(parsed.materials.len(), 2);
        assert_eq!(material(&parsed.materials[0]).ambient, Color::gray(0.1));
    }

    #[test]
    fn every_property_command() {
        let text = "\
# a comment line
newmtl full
Ka 0.1 0.2 0.3
Kd 0.4 0.5 0.6
Ks 0.7 0.8 0.9
Ns 0.75
illum 2
a 0.5
";
        let parsed = parse(text).unwrap();
        let m = material(&parsed.materials[0]);
        assert_eq!(m.ambient, Color::new(0.1, 0.2, 0.3));
        assert_eq!(m.base, Color::new(0.4, 0.5, 0.6));
        assert_eq!(m.specular, Color::new(0.7, 0.8, 0.9));
        assert_eq!(m.shininess, 0.75);
        assert_eq!(m.illumination, IlluminationModel::Specular);
        assert_eq!(m.opacity, 0.5);
    }

    // -----------------------------------------------------------------------
    // Clamping
    // -----------------------------------------------------------------------

    #[test]
    fn color_components_clamped() {
        let parsed = parse("newmtl X\nKd 2.0 -1.0 0.5\n").unwrap();
        assert_eq!(material(&parsed.materials[0]).base, Color::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn transparency_inverts_and_clamps() {
        let parsed = parse("newmtl a\nTr 0.25\nnewmtl b\nTr -3\nnewmtl c\na 7\n").unwrap();
        assert_eq!(material(&parsed.materials[0]).opacity, 0.75);
        assert_eq!(material(&parsed.materials[1]).opacity, 1.0);
        assert_eq!(material(&parsed.materials[2]).opacity, 1.0);
    }

    #[test]
    fn shininess_clamped() {
        let parsed = parse("newmtl a\nNs 250\n").unwrap();
        assert_eq!(material(&parsed.materials[0]).shininess, 1.0);
    }

    #[test]
    fn unknown_illumination_model_kept() {
        let parsed = parse("newmtl a\nillum 9\n").unwrap();
        assert_eq!(
            material(&parsed.materials[0]).illumination,
            IlluminationModel::Other(9)
        );
    }

    // -----------------------------------------------------------------------
    // Ignored input
    // -----------------------------------------------------------------------

    #[test]
    fn argumentless_and_unknown_commands_ignored() {
        let parsed = parse("Kd\nnewmtl\nfoo 1 2 3\nnewmtl a\nKd\nbump x.png\n# Kd 9 9 9\n").unwrap();
        assert_eq!(parsed.materials.len(), 1);
        assert_eq!(material(&parsed.materials[0]).base, Material::DEFAULT_BASE);
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[test]
    fn property_before_newmtl_fails() {
        let err = parse("Kd 1 1 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::NoActiveAsset {
                line: 1,
                command: "kd".to_string()
            }
        );
    }

    #[test]
    fn every_property_requires_active_material() {
        for line in ["Ka 1 1 1", "Ks 1 1 1", "a 1", "Tr 0", "Ns 1", "illum 1", "map_Ka a.png"] {
            let err = parse(line).unwrap_err();
            assert!(
                matches!(err, ParseError::NoActiveAsset { line: 1, .. }),
                "{line}"
            );
        }
    }

    #[test]
    fn non_numeric_color_fails_with_line() {
        let err = parse("newmtl a\n\nKd 1 x 1\n").unwrap_err();
        assert!(matches!(err, ParseError::Format { line: 3, .. }));
    }

    #[test]
    fn wrong_color_arity_fails() {
        assert!(matches!(
            parse("newmtl a\nKa 1 1\n"),
            Err(ParseError::Format { line: 2, .. })
        ));
        assert!(matches!(
            parse("newmtl a\nKs 1 1 1 1\n"),
            Err(ParseError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn non_integer_illum_fails() {
        assert!(matches!(
            parse("newmtl a\nillum 1.5\n"),
            Err(ParseError::Format { line: 2, .. })
        ));
    }

    #[test]
    fn repeated_material_name_keeps_both() {
        let parsed = parse("newmtl X\nKd 1 0 0\nnewmtl X\nKd 0 1 0\n").unwrap();
        assert_eq!(parsed.materials.len(), 2);

        let (first, second) = (&parsed.materials[0], &parsed.materials[1]);
        assert_ne!(first.guid, second.guid);
        assert_eq!(material(first).base, Color::new(1.0, 0.0, 0.0));
        assert_eq!(material(second).base, Color::new(0.0, 1.0, 0.0));
        assert_eq!(first.logical_path, "core/materials/stone.mtl#X");
        assert_eq!(second.logical_path, "core/materials/stone.mtl#X#1");
    }

    #[test]
    fn repeated_material_names_register_together() {
        let parsed = parse("newmtl X\nnewmtl Y\nnewmtl X\nnewmtl X\n").unwrap();
        let mut registry = AssetRegistry::new();
        for asset in parsed.into_assets() {
            registry.insert(asset).unwrap();
        }

        assert_eq!(registry.len(), 5);
        for path in ["#X", "#Y", "#X#2", "#X#3"] {
            let path = format!("core/materials/stone.mtl{path}");
            assert!(registry.material_at(&path).is_some(), "{path}");
        }
    }

    // -----------------------------------------------------------------------
    // Texture references
    // -----------------------------------------------------------------------

    #[test]
    fn missing_texture_leaves_slot_unset() {
        let parsed = parse("newmtl A\nmap_Ka missing.png\n").unwrap();
        assert_eq!(parsed.materials.len(), 1);
        assert!(material(&parsed.materials[0]).base_map.is_none());
    }

    #[test]
    fn registered_texture_is_attached() {
        let mut assets = AssetRegistry::new();
        let texture_guid = Guid::for_file("core", "textures/granite.png");
        assets
            .insert(Asset::new(
                texture_guid,
                "core",
                "/packages/core/textures/granite.png",
                "core/textures/granite.png",
                AssetData::Texture(Texture { bytes: vec![1] }),
            ))
            .unwrap();

        let text = "newmtl granite\nmap_Ka ../textures/granite.png\n";
        let parsed = parse_material_library(text, &source(), &assets).unwrap();
        assert_eq!(
            material(&parsed.materials[0]).base_map,
            Some(texture_guid)
        );
    }

    #[test]
    fn into_assets_puts_library_last() {
        let parsed = parse("newmtl a\nnewmtl b\n").unwrap();
        let assets = parsed.into_assets();
        assert_eq!(assets.len(), 3);
        assert!(assets[2].as_material_library().is_some());
    }
}
