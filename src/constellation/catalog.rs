//! Raw star catalog: approximate J2000 right ascension / declination (degrees)
//! of the bright stars outlining each constellation.

pub struct RawConstellation {
    pub name: &'static str,
    /// (ra, dec) in degrees
    pub stars: &'static [(f32, f32)],
    pub connections: &'static [[usize; 2]],
}

pub const RAW_CATALOG: &[RawConstellation] = &[
    RawConstellation {
        name: "Ursa Major",
        // Dubhe, Merak, Phecda, Megrez, Alioth, Mizar, Alkaid
        stars: &[
            (165.93, 61.75),
            (165.46, 56.38),
            (178.46, 53.69),
            (183.86, 57.03),
            (193.51, 55.96),
            (200.98, 54.93),
            (206.89, 49.31),
        ],
        connections: &[[0, 1], [1, 2], [2, 3], [3, 0], [3, 4], [4, 5], [5, 6]],
    },
    RawConstellation {
        name: "Cassiopeia",
        // Caph, Schedar, Gamma Cas, Ruchbah, Segin
        stars: &[
            (2.29, 59.15),
            (10.13, 56.54),
            (14.18, 60.72),
            (21.45, 60.24),
            (28.60, 63.67),
        ],
        connections: &[[0, 1], [1, 2], [2, 3], [3, 4]],
    },
    RawConstellation {
        name: "Orion",
        // Betelgeuse, Bellatrix, Alnitak, Alnilam, Mintaka, Saiph, Rigel
        stars: &[
            (88.79, 7.41),
            (81.28, 6.35),
            (85.19, -1.94),
            (84.05, -1.20),
            (83.00, -0.30),
            (86.94, -9.67),
            (78.63, -8.20),
        ],
        connections: &[
            [0, 1],
            [0, 2],
            [1, 4],
            [2, 3],
            [3, 4],
            [2, 5],
            [4, 6],
            [5, 6],
        ],
    },
    RawConstellation {
        name: "Lyra",
        // Vega, Zeta Lyr, Sheliak, Sulafat, Delta Lyr
        stars: &[
            (279.23, 38.78),
            (281.19, 37.61),
            (282.52, 33.36),
            (284.74, 32.69),
            (283.63, 36.90),
        ],
        connections: &[[0, 1], [1, 2], [2, 3], [3, 4], [4, 1]],
    },
    RawConstellation {
        name: "Cygnus",
        // Deneb, Sadr, Eta Cyg, Albireo, Delta Cyg, Gienah
        stars: &[
            (310.36, 45.28),
            (305.56, 40.26),
            (299.08, 35.08),
            (292.68, 27.96),
            (296.24, 45.13),
            (311.55, 33.97),
        ],
        connections: &[[0, 1], [1, 2], [2, 3], [4, 1], [1, 5]],
    },
    RawConstellation {
        name: "Leo",
        // Regulus, Eta Leo, Algieba, Zosma, Denebola, Chertan
        stars: &[
            (152.09, 11.97),
            (151.83, 16.76),
            (154.99, 19.84),
            (168.53, 20.52),
            (177.26, 14.57),
            (168.56, 15.43),
        ],
        connections: &[[0, 1], [1, 2], [2, 3], [3, 4], [4, 5], [5, 0]],
    },
    RawConstellation {
        name: "Crux",
        // Acrux, Mimosa, Gacrux, Delta Cru
        stars: &[
            (186.65, -63.10),
            (191.93, -59.69),
            (187.79, -57.11),
            (183.79, -58.75),
        ],
        connections: &[[0, 2], [1, 3]],
    },
    RawConstellation {
        name: "Scorpius",
        // Antares, Graffias, Dschubba, Pi Sco, Tau Sco, Epsilon Sco, Shaula, Sargas
        stars: &[
            (247.35, -26.43),
            (241.36, -19.81),
            (240.08, -22.62),
            (239.71, -26.11),
            (248.97, -28.22),
            (252.54, -34.29),
            (263.40, -37.10),
            (264.33, -43.00),
        ],
        connections: &[[1, 2], [2, 3], [2, 0], [0, 4], [4, 5], [5, 7], [7, 6]],
    },
    RawConstellation {
        name: "Gemini",
        // Castor, Pollux, Alhena, Mebsuta, Wasat, Tejat
        stars: &[
            (113.65, 31.89),
            (116.33, 28.03),
            (99.43, 16.40),
            (100.98, 25.13),
            (110.03, 21.98),
            (95.74, 22.51),
        ],
        connections: &[[0, 3], [3, 5], [1, 4], [4, 2], [0, 1]],
    },
    RawConstellation {
        name: "Triangulum",
        // Beta Tri, Alpha Tri, Gamma Tri
        stars: &[(32.39, 34.99), (28.27, 29.58), (34.33, 33.85)],
        connections: &[[0, 1], [1, 2], [2, 0]],
    },
];
