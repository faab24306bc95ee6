//! FILENAME: core/perimeter-engine/src/seeds.rs
//! Static shape of the generated catalog.
//!
//! The tree is literal data; ids, tags and metrics are derived from it by
//! `Catalog::build`. Labels are unique within each level.

pub struct MarketSeed {
    pub label: &'static str,
    pub description: &'static str,
    pub detailed: &'static [DetailedSeed],
}

pub struct DetailedSeed {
    pub label: &'static str,
    /// Portfolio every product below belongs to.
    pub portfolio: &'static str,
    pub categories: &'static [CategorySeed],
}

pub struct CategorySeed {
    pub label: &'static str,
    pub groups: &'static [GroupSeed],
}

pub struct GroupSeed {
    pub label: &'static str,
    pub families: &'static [FamilySeed],
}

pub struct FamilySeed {
    pub label: &'static str,
    pub sub_families: &'static [&'static str],
}

// ============================================================================
// PRODUCT HIERARCHY
// ============================================================================

pub static MARKETS: &[MarketSeed] = &[
    MarketSeed {
        label: "PLS",
        description: "Libre-service",
        detailed: &[
            DetailedSeed {
                label: "PLS Crèmerie",
                portfolio: "Frais",
                categories: &[
                    CategorySeed {
                        label: "Yaourts",
                        groups: &[
                            GroupSeed {
                                label: "Yaourts natures & aromatisés",
                                families: &[
                                    FamilySeed {
                                        label: "Yaourts natures",
                                        sub_families: &["Yaourts nature brassés", "Yaourts nature fermes"],
                                    },
                                    FamilySeed {
                                        label: "Yaourts aromatisés",
                                        sub_families: &["Yaourts vanille", "Yaourts fruits rouges"],
                                    },
                                ],
                            },
                            GroupSeed {
                                label: "Yaourts grecs & skyr",
                                families: &[FamilySeed {
                                    label: "Skyr",
                                    sub_families: &["Skyr nature", "Skyr aux fruits"],
                                }],
                            },
                        ],
                    },
                    CategorySeed {
                        label: "Desserts lactés",
                        groups: &[GroupSeed {
                            label: "Crèmes dessert",
                            families: &[
                                FamilySeed {
                                    label: "Crèmes au chocolat",
                                    sub_families: &["Crèmes chocolat noir", "Liégeois"],
                                },
                                FamilySeed {
                                    label: "Flans",
                                    sub_families: &["Flans nappés caramel"],
                                },
                            ],
                        }],
                    },
                    CategorySeed {
                        label: "Fromages LS",
                        groups: &[
                            GroupSeed {
                                label: "Fromages à pâte molle",
                                families: &[FamilySeed {
                                    label: "Camemberts & Bries",
                                    sub_families: &["Camemberts", "Bries"],
                                }],
                            },
                            GroupSeed {
                                label: "Fromages à pâte pressée",
                                families: &[
                                    FamilySeed {
                                        label: "Emmentals",
                                        sub_families: &["Emmental râpé", "Emmental en bloc"],
                                    },
                                    FamilySeed {
                                        label: "Comtés",
                                        sub_families: &["Comté AOP"],
                                    },
                                ],
                            },
                        ],
                    },
                    CategorySeed {
                        label: "Beurres & Crèmes",
                        groups: &[GroupSeed {
                            label: "Beurres",
                            families: &[
                                FamilySeed {
                                    label: "Beurres doux",
                                    sub_families: &["Beurre doux plaquette", "Beurre tendre"],
                                },
                                FamilySeed {
                                    label: "Crèmes fraîches",
                                    sub_families: &["Crème épaisse", "Crème liquide"],
                                },
                            ],
                        }],
                    },
                    CategorySeed {
                        label: "Laits",
                        groups: &[GroupSeed {
                            label: "Laits de consommation",
                            families: &[FamilySeed {
                                label: "Laits UHT",
                                sub_families: &["Lait demi-écrémé", "Lait entier"],
                            }],
                        }],
                    },
                ],
            },
            DetailedSeed {
                label: "PLS Traiteur",
                portfolio: "Frais",
                categories: &[
                    CategorySeed {
                        label: "Charcuterie LS",
                        groups: &[
                            GroupSeed {
                                label: "Jambons",
                                families: &[FamilySeed {
                                    label: "Jambons cuits",
                                    sub_families: &["Jambon supérieur", "Jambon de volaille"],
                                }],
                            },
                            GroupSeed {
                                label: "Saucissons & Charcuterie sèche",
                                families: &[FamilySeed {
                                    label: "Saucissons secs",
                                    sub_families: &["Saucisson pur porc", "Chorizo"],
                                }],
                            },
                        ],
                    },
                    CategorySeed {
                        label: "Plats cuisinés",
                        groups: &[GroupSeed {
                            label: "Plats cuisinés frais",
                            families: &[
                                FamilySeed {
                                    label: "Plats individuels",
                                    sub_families: &["Plats à base de viande", "Plats végétariens"],
                                },
                                FamilySeed {
                                    label: "Gratins",
                                    sub_families: &["Gratins dauphinois"],
                                },
                            ],
                        }],
                    },
                    CategorySeed {
                        label: "Salades traiteur",
                        groups: &[GroupSeed {
                            label: "Salades composées",
                            families: &[FamilySeed {
                                label: "Taboulés & Salades",
                                sub_families: &["Taboulé oriental", "Salade piémontaise"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Pâtes fraîches",
                        groups: &[GroupSeed {
                            label: "Pâtes fraîches farcies",
                            families: &[FamilySeed {
                                label: "Raviolis & Tortellinis",
                                sub_families: &["Raviolis", "Tortellinis"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Snacking",
                        groups: &[GroupSeed {
                            label: "Snacking salé",
                            families: &[FamilySeed {
                                label: "Sandwichs & Wraps",
                                sub_families: &["Sandwichs triangle", "Wraps"],
                            }],
                        }],
                    },
                ],
            },
        ],
    },
    MarketSeed {
        label: "PGC",
        description: "Grande consommation",
        detailed: &[
            DetailedSeed {
                label: "Epicerie salée",
                portfolio: "Epicerie",
                categories: &[
                    CategorySeed {
                        label: "Conserves",
                        groups: &[GroupSeed {
                            label: "Conserves de légumes",
                            families: &[FamilySeed {
                                label: "Légumes en conserve",
                                sub_families: &["Haricots verts", "Petits pois carottes"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Pâtes & Riz",
                        groups: &[
                            GroupSeed {
                                label: "Pâtes sèches",
                                families: &[FamilySeed {
                                    label: "Pâtes longues",
                                    sub_families: &["Spaghettis", "Tagliatelles sèches"],
                                }],
                            },
                            GroupSeed {
                                label: "Riz",
                                families: &[FamilySeed {
                                    label: "Riz long",
                                    sub_families: &["Riz basmati", "Riz thaï"],
                                }],
                            },
                        ],
                    },
                    CategorySeed {
                        label: "Condiments",
                        groups: &[GroupSeed {
                            label: "Sauces froides",
                            families: &[FamilySeed {
                                label: "Moutardes & Mayonnaises",
                                sub_families: &["Moutarde de Dijon", "Mayonnaise"],
                            }],
                        }],
                    },
                ],
            },
            DetailedSeed {
                label: "Epicerie sucrée",
                portfolio: "Epicerie",
                categories: &[
                    CategorySeed {
                        label: "Biscuits",
                        groups: &[GroupSeed {
                            label: "Biscuits sucrés",
                            families: &[
                                FamilySeed {
                                    label: "Biscuits secs",
                                    sub_families: &["Petits beurre", "Sablés"],
                                },
                                FamilySeed {
                                    label: "Biscuits chocolatés",
                                    sub_families: &["Cookies", "Biscuits fourrés"],
                                },
                            ],
                        }],
                    },
                    CategorySeed {
                        label: "Confiserie",
                        groups: &[GroupSeed {
                            label: "Bonbons",
                            families: &[FamilySeed {
                                label: "Bonbons gélifiés",
                                sub_families: &["Oursons", "Bonbons acidulés"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Petit-déjeuner",
                        groups: &[GroupSeed {
                            label: "Céréales & Tartinables",
                            families: &[
                                FamilySeed {
                                    label: "Céréales",
                                    sub_families: &["Céréales enfants", "Mueslis"],
                                },
                                FamilySeed {
                                    label: "Pâtes à tartiner",
                                    sub_families: &["Pâtes à tartiner chocolat"],
                                },
                            ],
                        }],
                    },
                ],
            },
            DetailedSeed {
                label: "Liquides",
                portfolio: "Liquides",
                categories: &[
                    CategorySeed {
                        label: "Eaux",
                        groups: &[GroupSeed {
                            label: "Eaux plates & gazeuses",
                            families: &[
                                FamilySeed {
                                    label: "Eaux plates",
                                    sub_families: &["Eaux de source", "Eaux minérales"],
                                },
                                FamilySeed {
                                    label: "Eaux gazeuses",
                                    sub_families: &["Eaux pétillantes"],
                                },
                            ],
                        }],
                    },
                    CategorySeed {
                        label: "Boissons gazeuses",
                        groups: &[GroupSeed {
                            label: "Sodas",
                            families: &[FamilySeed {
                                label: "Colas",
                                sub_families: &["Colas classiques", "Colas sans sucres"],
                            }],
                        }],
                    },
                ],
            },
        ],
    },
    MarketSeed {
        label: "DPH",
        description: "Droguerie Parfumerie Hygiène",
        detailed: &[
            DetailedSeed {
                label: "Hygiène",
                portfolio: "DPH",
                categories: &[
                    CategorySeed {
                        label: "Soins corps",
                        groups: &[GroupSeed {
                            label: "Gels douche & Savons",
                            families: &[FamilySeed {
                                label: "Gels douche",
                                sub_families: &["Gels douche hydratants", "Gels douche homme"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Hygiène dentaire",
                        groups: &[GroupSeed {
                            label: "Dentifrices & Brosses",
                            families: &[FamilySeed {
                                label: "Dentifrices",
                                sub_families: &["Dentifrices blancheur", "Dentifrices sensibilité"],
                            }],
                        }],
                    },
                ],
            },
            DetailedSeed {
                label: "Entretien",
                portfolio: "DPH",
                categories: &[
                    CategorySeed {
                        label: "Lessives",
                        groups: &[GroupSeed {
                            label: "Lessives linge",
                            families: &[FamilySeed {
                                label: "Lessives liquides",
                                sub_families: &["Lessive liquide standard", "Capsules de lessive"],
                            }],
                        }],
                    },
                    CategorySeed {
                        label: "Nettoyants ménagers",
                        groups: &[GroupSeed {
                            label: "Nettoyants multi-usages",
                            families: &[FamilySeed {
                                label: "Nettoyants surfaces",
                                sub_families: &["Sprays multi-surfaces", "Nettoyants sols"],
                            }],
                        }],
                    },
                ],
            },
        ],
    },
];

// ============================================================================
// CROSS-CUTTING DIMENSIONS
// ============================================================================

pub static SUPPLIERS: &[&str] = &[
    "Laiterie du Val",
    "Fromagerie des Alpes",
    "Maison Charcutière",
    "Conserverie Atlantique",
    "Biscuiterie Moreau",
    "Sources Pyrénéennes",
    "Hygiena Europe",
    "Groupe Entretien Plus",
];

pub static PORTFOLIOS: &[&str] = &["Frais", "Epicerie", "Liquides", "DPH"];

/// The first entry is the home market.
pub static COUNTRIES: &[&str] = &["France", "Allemagne", "Espagne", "Italie", "Belgique"];

/// Appended to the sub-family label to name each product.
pub static PRODUCT_VARIANTS: &[&str] = &[
    "Marque nationale",
    "Marque distributeur",
    "Premier prix",
    "Bio",
    "Format familial",
    "Edition limitée",
];
