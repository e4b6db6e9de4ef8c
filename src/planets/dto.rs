use std::str::FromStr;

use crate::{
    planets::repo_types::NewPlanet,
    validation::{self, CharField, ChoiceField, FieldErrors, IntegerField, Payload},
};

pub const DEFAULT_COLOR: &str = "#1E90FF";
const NAME_MAX_LENGTH: usize = 50;
const SEED_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terrain {
    Rocky,
    Icy,
    Gaseous,
    Desert,
    Jungle,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Rocky,
        Terrain::Icy,
        Terrain::Gaseous,
        Terrain::Desert,
        Terrain::Jungle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Rocky => "rocky",
            Terrain::Icy => "icy",
            Terrain::Gaseous => "gaseous",
            Terrain::Desert => "desert",
            Terrain::Jungle => "jungle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerrain;

impl FromStr for Terrain {
    type Err = UnknownTerrain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Terrain::ALL
            .into_iter()
            .find(|terrain| terrain.as_str() == s)
            .ok_or(UnknownTerrain)
    }
}

fn color_field(name: &'static str) -> CharField {
    CharField::required(name).max_length(7).format(validation::hex_color)
}

/// Body of `POST /planets/`.
pub struct CreatePlanetRequest {
    pub planet: NewPlanet,
}

impl CreatePlanetRequest {
    pub fn from_payload(payload: &Payload) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = CharField::required("name")
            .max_length(NAME_MAX_LENGTH)
            .clean(payload, &mut errors);
        let seed = CharField::required("seed")
            .max_length(SEED_MAX_LENGTH)
            .clean(payload, &mut errors);
        let terrain = ChoiceField::required("terrain").clean::<Terrain>(payload, &mut errors);
        let atmosphere_color = color_field("atmosphere_color").clean(payload, &mut errors);
        let liquid_percent = IntegerField::with_default("liquid_percent", 0)
            .range(0, 100)
            .clean(payload, &mut errors);
        let liquid_color = color_field("liquid_color")
            .partial()
            .clean(payload, &mut errors)
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());
        let land_color = color_field("land_color")
            .partial()
            .clean(payload, &mut errors)
            .unwrap_or_else(|| DEFAULT_COLOR.to_string());

        match (name, seed, terrain, atmosphere_color, liquid_percent) {
            (Some(name), Some(seed), Some(terrain), Some(atmosphere_color), Some(liquid_percent))
                if errors.is_empty() =>
            {
                Ok(Self {
                    planet: NewPlanet {
                        name,
                        seed,
                        terrain,
                        atmosphere_color,
                        liquid_percent,
                        liquid_color,
                        land_color,
                    },
                })
            }
            _ => Err(errors),
        }
    }
}
