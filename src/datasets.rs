use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// A bundled demo dataset, selectable from the CLI by name.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    pub csv: &'static str,
}

const SIMPSONS_CSV: &str = "\
Male,Duff Fan,Power Plant,Evil,School,Blue Hair
Kent Brockman,Barney,Lenny Leonard,Krusty,Martin Prince,Milhouse
Grampa,Mo,Carl Carlson,Nelson,Bart,Marge
Ned,Krusty,Homer,Mr. Burns,Ralph,Jacqueline Bouvier
Barney,Lenny Leonard,,Smithers,Nelson,
Mo,Carl Carlson,,Sideshow Bob,Milhouse,
Martin Prince,Homer,,Fat Tony,Lisa,
Bart,,,,,
Ralph,,,,,
Krusty,,,,,
Nelson,,,,,
Milhouse,,,,,
Lenny Leonard,,,,,
Carl Carlson,,,,,
Homer,,,,,
Mr. Burns,,,,,
Smithers,,,,,
Sideshow Bob,,,,,
Fat Tony,,,,,";

const POTTER_CSV: &str = "\
Animal,Ghost,Deatheater,Animagus,Alive,Student,Muggle-born,Griffindor,Wizard
Ms.Norris,Myrte,Wormtail,Remus,Ms.Norris,Draco,Hermione,Dumbledore,Dumbledore
,,Draco,Sirius,Dumbledore,Harry,Lily,Hagrid,Hagrid
,,,Wormtail,Hagrid,Ron,,Remus,Remus
,,,,Remus,Hermione,,Sirius,Sirius
,,,,Sirius,,,Wormtail,Wormtail
,,,,Wormtail,,,Harry,Draco
,,,,Draco,,,Ron,Harry
,,,,Harry,,,Hermione,Ron
,,,,Ron,,,Lily,Hermione
,,,,Hermione,,,James,Lily
,,,,Petunia,,,,James
,,,,Dudley,,,,Myrte
,,,,Vernon,,,,Grindelwald";

const VITAMINS_CSV: &str = "\
Vitamin A,Vitamin B,Vitamin C,Vitamin D,Vitamin E,Vitamin K
Papaya,Tomato,Cabbage,Cod-Liver Oil,Butter,Soy-Beans
Mango,Vegetables,Cucumber,Fish,Milk,Tomato
Carrot,Wholegrain cereals,Orange,Butter,Egg,Vegetables
Liver,Peanut,Grapes,Milk,Green vegetables,Vegetable Oil
Cod-Liver Oil,Mutton,Lemon,Egg,Wheat Germ Oil,Meat
Butter,Potato,Guava,,Banana,
Milk,Yeast,Amla,,Apple,
Egg,,Green vegetables,,Soy-Beans,
,,Tomato,,,";

const VENN4_CSV: &str = "\
A,B,C,D
a,b,c,d
ab,abc,cd,cd
abc,abcd,ac,acd
abcd,abd,acd,ad
abd,ab,abc,abcd
acd,bc,abcd,abd
ad,bcd,bc,bcd
ac,bd,bcd,bd";

static SAMPLES: Lazy<BTreeMap<&'static str, Sample>> = Lazy::new(|| {
    let samples = [
        Sample {
            name: "simpsons",
            description: "Springfield residents across 6 overlapping categories",
            csv: SIMPSONS_CSV,
        },
        Sample {
            name: "potter",
            description: "Harry Potter characters across 9 categories",
            csv: POTTER_CSV,
        },
        Sample {
            name: "vitamins",
            description: "Foods by the vitamins they provide",
            csv: VITAMINS_CSV,
        },
        Sample {
            name: "venn4",
            description: "A complete 4-set Venn arrangement",
            csv: VENN4_CSV,
        },
    ];
    samples.into_iter().map(|sample| (sample.name, sample)).collect()
});

pub fn sample(name: &str) -> Option<Sample> {
    SAMPLES.get(name).copied()
}

pub fn sample_names() -> Vec<&'static str> {
    SAMPLES.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;

    #[test]
    fn all_samples_parse_consistently() {
        for name in sample_names() {
            let data = parse_csv(sample(name).unwrap().csv)
                .unwrap_or_else(|err| panic!("{name}: {err}"));
            assert!(data.is_consistent(), "{name} is inconsistent");
            assert!(!data.labels.is_empty());
            assert!(!data.values.is_empty());
        }
    }

    #[test]
    fn lookup_is_by_name() {
        assert!(sample("simpsons").is_some());
        assert!(sample("nope").is_none());
    }
}
