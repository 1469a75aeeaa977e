//! Static skill tables. Every canonical name is lowercase; variants are listed
//! without the canonical itself (it is always registered).

/// (category, &[(canonical, &[variants])])
pub const SKILL_TABLE: &[(&str, &[(&str, &[&str])])] = &[
    (
        "languages",
        &[
            ("python", &["py", "python3"]),
            ("java", &[]),
            ("javascript", &["js", "ecmascript"]),
            ("typescript", &[]),
            ("c++", &["cpp", "c plus plus"]),
            ("c#", &["csharp", "c sharp"]),
            ("go", &["golang"]),
            ("rust", &[]),
            ("php", &[]),
            ("ruby", &[]),
            ("swift", &[]),
            ("kotlin", &[]),
            ("scala", &[]),
            ("r", &[]),
            ("matlab", &[]),
            ("perl", &[]),
            ("dart", &[]),
            ("bash", &["shell scripting"]),
            ("sql", &["tsql", "t-sql", "pl/sql"]),
        ],
    ),
    (
        "frameworks_web",
        &[
            ("node.js", &["nodejs", "node js"]),
            ("react", &["reactjs", "react.js"]),
            ("angular", &["angularjs", "angular.js"]),
            ("vue.js", &["vuejs", "vue js", "vue"]),
            ("next.js", &["nextjs"]),
            ("svelte", &[]),
            ("django", &[]),
            ("flask", &[]),
            ("fastapi", &[]),
            ("spring boot", &["springboot"]),
            ("spring", &[]),
            ("express", &["express.js", "expressjs"]),
            ("nestjs", &["nest.js"]),
            ("laravel", &[]),
            ("symfony", &[]),
            ("ruby on rails", &["rails"]),
            (".net", &["dotnet", ".net core", "asp.net", "aspnet"]),
            ("flutter", &[]),
            ("react native", &[]),
        ],
    ),
    (
        "frontend",
        &[
            ("html", &["html5"]),
            ("css", &["css3"]),
            ("sass", &["scss"]),
            ("tailwind", &["tailwindcss", "tailwind css"]),
            ("bootstrap", &[]),
            ("webpack", &[]),
        ],
    ),
    (
        "databases",
        &[
            ("postgresql", &["postgres"]),
            ("mysql", &[]),
            ("mongodb", &["mongo"]),
            ("redis", &[]),
            ("elasticsearch", &["elastic search"]),
            ("oracle", &[]),
            ("sql server", &["mssql"]),
            ("cassandra", &[]),
            ("dynamodb", &[]),
            ("sqlite", &[]),
            ("mariadb", &[]),
            ("neo4j", &[]),
        ],
    ),
    (
        "data",
        &[
            ("spark", &["apache spark", "pyspark"]),
            ("hadoop", &[]),
            ("kafka", &["apache kafka"]),
            ("airflow", &["apache airflow"]),
            ("dbt", &[]),
            ("power bi", &["powerbi"]),
            ("tableau", &[]),
            ("etl", &[]),
            ("big data", &[]),
            ("data science", &[]),
        ],
    ),
    (
        "cloud_devops",
        &[
            ("aws", &["amazon web services"]),
            ("azure", &["microsoft azure"]),
            ("gcp", &["google cloud", "google cloud platform"]),
            ("docker", &[]),
            ("kubernetes", &[]),
            ("terraform", &[]),
            ("ansible", &[]),
            ("jenkins", &[]),
            ("gitlab ci", &["gitlab-ci"]),
            ("github actions", &[]),
            ("helm", &[]),
            ("prometheus", &[]),
            ("grafana", &[]),
            ("nginx", &[]),
            ("linux", &["unix"]),
            ("docker compose", &["docker-compose"]),
        ],
    ),
    (
        "ai_ml",
        &[
            ("machine learning", &[]),
            ("deep learning", &[]),
            ("tensorflow", &[]),
            ("pytorch", &[]),
            ("scikit-learn", &["sklearn", "scikit learn"]),
            ("pandas", &[]),
            ("numpy", &[]),
            ("natural language processing", &[]),
            ("computer vision", &["image processing"]),
            ("hugging face", &["huggingface"]),
            ("llm", &["large language model", "large language models"]),
            ("keras", &[]),
            ("mlflow", &[]),
        ],
    ),
    (
        "tools",
        &[
            ("git", &["github", "gitlab", "bitbucket"]),
            ("jira", &[]),
            ("confluence", &[]),
            ("postman", &[]),
            ("swagger", &["openapi"]),
            ("maven", &[]),
            ("gradle", &[]),
            ("npm", &["yarn"]),
            ("pytest", &[]),
            ("junit", &[]),
        ],
    ),
    (
        "concepts",
        &[
            ("rest api", &["restful", "rest apis"]),
            ("graphql", &["graph ql"]),
            ("grpc", &[]),
            ("microservices", &["microservice"]),
            ("continuous integration", &["ci/cd", "cicd", "ci-cd", "continuous deployment"]),
            ("devops", &[]),
            ("agile", &["scrum", "kanban"]),
            ("test driven development", &[]),
            ("site reliability engineering", &[]),
            ("infrastructure as code", &[]),
            ("serverless", &[]),
            ("oauth", &["oauth2"]),
            ("unit testing", &["unit tests", "tests unitaires"]),
        ],
    ),
];

/// Curated acronym expansions: (acronym, canonical).
pub const ACRONYMS: &[(&str, &str)] = &[
    ("k8s", "kubernetes"),
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("nlp", "natural language processing"),
    ("cv", "computer vision"),
    ("ci", "continuous integration"),
    ("cd", "continuous integration"),
    ("tdd", "test driven development"),
    ("sre", "site reliability engineering"),
    ("iac", "infrastructure as code"),
    ("tf", "tensorflow"),
    ("gke", "gcp"),
    ("eks", "aws"),
    ("aks", "azure"),
];

/// Short tokens (length <= 2) that are still allowed to resolve to a skill.
pub const SHORT_TOKEN_WHITELIST: &[&str] = &["go", "r", "py", "ml", "ai", "ci"];

/// Canonical names or phrases never reported as technical skills.
pub const SOFT_SKILL_STOPLIST: &[&str] = &[
    "communication",
    "management",
    "leadership",
    "teamwork",
    "organization",
    "client service",
    "sales",
    "marketing",
    "negotiation",
    "presentation",
    "analytical",
    "problem solving",
    "critical thinking",
    "planning",
    "french",
    "english",
    "arabic",
    "spanish",
    "german",
    "portuguese",
    "license",
    "permit",
    "driving",
    "language",
    "soft skills",
];

/// Title or text fragments typical of non-technical jobs.
pub const NON_TECH_TITLE_KEYWORDS: &[&str] = &[
    "caissier",
    "cashier",
    "vendeur",
    "sales",
    "marketing",
    "accounting",
    "comptable",
    "finance",
    "hr",
    "ressources humaines",
    "commercial",
    "manager",
    "directeur",
    "chef",
    "assistant",
    "administratif",
    "secrétaire",
    "secretary",
    "receptionist",
    "accueil",
];

/// Fragments that point at a technical job even without a named skill.
pub const TECH_INDICATORS: &[&str] = &[
    "développ",
    "develop",
    "engineer",
    "ingénieur",
    "technic",
    "informati",
    "programmer",
    "coding",
    "devops",
    "sysadmin",
    "architecture",
    "backend",
    "frontend",
    "fullstack",
    "full-stack",
    "cloud",
    "database",
    "api",
];
